/// Colours and sizes used to draw the skeleton. Colours are RGB.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayStyle {
    pub connection_color: [u8; 3],
    pub connection_thickness: u32,
    pub landmark_color: [u8; 3],
    pub landmark_radius: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            connection_color: [0, 255, 0],
            connection_thickness: 2,
            landmark_color: [255, 255, 255],
            landmark_radius: 2,
        }
    }
}
