//! Text for peak/marker readouts and axis ticks

use crate::marker::MarkerReading;
use crate::spectrum::PeakReading;

pub fn peak_label(peak: &PeakReading) -> String {
    format!("Peak: {:.2}Hz, {:.4}V", peak.frequency_hz, peak.magnitude)
}

pub fn marker_label(marker: &MarkerReading) -> String {
    format!("Marker: {:.2}Hz, {:.2}V", marker.frequency_hz, marker.magnitude)
}

/// Short tick label: 1500 -> "1.5k", 0.25 -> "0.25"
pub fn axis_label(value: f32) -> String {
    let abs = value.abs();
    if abs >= 1000.0 {
        if value % 1000.0 == 0.0 {
            format!("{}k", (value / 1000.0) as i64)
        } else {
            format!("{:.1}k", value / 1000.0)
        }
    } else if abs >= 10.0 || value == value.trunc() {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_readout() {
        let peak = PeakReading { bin: 186, frequency_hz: 1001.7891, magnitude: 0.123456 };
        assert_eq!(peak_label(&peak), "Peak: 1001.79Hz, 0.1235V");
    }

    #[test]
    fn marker_readout() {
        let marker = MarkerReading { frequency_hz: 440.0, bin: 81, magnitude: 0.5 };
        assert_eq!(marker_label(&marker), "Marker: 440.00Hz, 0.50V");
    }

    #[test]
    fn axis_labels() {
        assert_eq!(axis_label(10000.0), "10k");
        assert_eq!(axis_label(5025.0), "5.0k");
        assert_eq!(axis_label(5000.0), "5k");
        assert_eq!(axis_label(-2000.0), "-2k");
        assert_eq!(axis_label(1500.0), "1.5k");
        assert_eq!(axis_label(50.0), "50");
        assert_eq!(axis_label(-127.0), "-127");
        assert_eq!(axis_label(1.0), "1");
        assert_eq!(axis_label(0.5), "0.50");
    }
}
