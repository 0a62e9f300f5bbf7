//! Conversion between the authoring space (origin top-left, y down, as the
//! layout designer reports it) and PDF output space (origin bottom-left,
//! y up). Every vertical placement in the renderer goes through here.

/// Output-space y of the bottom edge of a box whose top edge sits at
/// `web_y` in authoring space.
pub fn box_y(page_height: f32, web_y: f32, height: f32) -> f32 {
    page_height - web_y - height
}

/// Output-space baseline for a line of text whose box top sits at `web_y`.
pub fn baseline_y(page_height: f32, web_y: f32, font_size: f32) -> f32 {
    page_height - web_y - font_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_round_trip_holds() {
        let page_h = 841.89;
        for &(web_y, h) in &[(0.0, 0.0), (40.0, 60.0), (240.0, 300.0), (800.0, 41.89)] {
            let out = box_y(page_h, web_y, h);
            assert!((out + h - (page_h - web_y)).abs() < 1e-3);
        }
    }

    #[test]
    fn baseline_sits_one_font_size_below_box_top() {
        assert!((baseline_y(800.0, 100.0, 12.0) - 688.0).abs() < 1e-4);
    }
}
