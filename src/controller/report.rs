use bitflags::bitflags;

pub const AXIS_MAX: i32 = 32767;
pub const AXIS_MIN: i32 = -32767;
pub const TRIGGER_MAX: u8 = 255;

bitflags! {
    /// Button bitmask in XUSB (Xbox 360) layout.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        const DPAD_UP        = 0x0001;
        const DPAD_DOWN      = 0x0002;
        const DPAD_LEFT      = 0x0004;
        const DPAD_RIGHT     = 0x0008;
        const START          = 0x0010;
        const BACK           = 0x0020;
        const LEFT_THUMB     = 0x0040;
        const RIGHT_THUMB    = 0x0080;
        const LEFT_SHOULDER  = 0x0100;
        const RIGHT_SHOULDER = 0x0200;
        const GUIDE          = 0x0400;
        const A              = 0x1000;
        const B              = 0x2000;
        const X              = 0x4000;
        const Y              = 0x8000;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Buttons::empty()
    }
}

/// One complete gamepad state as handed to the sink.
///
/// Built from zero every cycle, so nothing carries over between reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerReport {
    pub buttons: Buttons,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

impl ControllerReport {
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

/// Clamps a summed axis value into the symmetric stick range.
pub fn clamp_axis(value: i32) -> i16 {
    value.clamp(AXIS_MIN, AXIS_MAX) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_is_symmetric() {
        assert_eq!(clamp_axis(AXIS_MAX + AXIS_MAX), 32767);
        assert_eq!(clamp_axis(AXIS_MIN + AXIS_MIN), -32767);
        assert_eq!(clamp_axis(i32::MIN), -32767);
        assert_eq!(clamp_axis(AXIS_MAX + AXIS_MIN), 0);
    }

    #[test]
    fn default_report_is_neutral() {
        assert!(ControllerReport::default().is_neutral());
        assert_eq!(ControllerReport::default().buttons.bits(), 0);
    }
}
