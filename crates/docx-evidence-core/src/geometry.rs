//! Display size of an inline picture.

/// EMUs (English Metric Units) per centimetre.
pub const EMU_PER_CM: f64 = 360_000.0;

/// Widest an injected picture may be, in centimetres.
pub const DEFAULT_MAX_WIDTH_CM: f64 = 15.0;

/// Size of a picture on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl DisplaySize {
    /// Scale `pixel_width` × `pixel_height` so the longer side fits in
    /// `max_width_cm`, keeping the aspect ratio. `None` for a zero dimension.
    pub fn fit(pixel_width: u32, pixel_height: u32, max_width_cm: f64) -> Option<Self> {
        if pixel_width == 0 || pixel_height == 0 {
            return None;
        }
        let w = f64::from(pixel_width);
        let h = f64::from(pixel_height);

        let width_cm = max_width_cm.min(w * max_width_cm / w.max(h));
        let height_cm = width_cm * h / w;
        Some(Self {
            width_cm,
            height_cm,
        })
    }

    pub fn width_emu(&self) -> u64 {
        to_emu(self.width_cm)
    }

    pub fn height_emu(&self) -> u64 {
        to_emu(self.height_cm)
    }
}

fn to_emu(cm: f64) -> u64 {
    (cm * EMU_PER_CM).round() as u64
}
