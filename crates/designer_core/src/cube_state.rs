use shared::{
    domain::{Color, Face, StickerPos, STICKERS_PER_FACE, STICKER_COUNT},
    error::CubeStringError,
    protocol::CubeString,
};

/// Dense 54-slot sticker grid. Every slot always holds a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeState {
    stickers: [Color; STICKER_COUNT],
}

impl Default for CubeState {
    fn default() -> Self {
        Self::reference()
    }
}

impl CubeState {
    /// Each face painted with its own ordinal's color.
    pub fn reference() -> Self {
        let mut stickers = [Color::Green; STICKER_COUNT];
        for pos in StickerPos::all() {
            stickers[pos.index()] = pos.face().reference_color();
        }
        Self { stickers }
    }

    pub fn color(&self, pos: StickerPos) -> Color {
        self.stickers[pos.index()]
    }

    pub fn face_colors(&self, face: Face) -> [Color; STICKERS_PER_FACE] {
        let start = usize::from(face.ordinal()) * STICKERS_PER_FACE;
        let mut colors = [Color::Green; STICKERS_PER_FACE];
        colors.copy_from_slice(&self.stickers[start..start + STICKERS_PER_FACE]);
        colors
    }

    pub fn stickers(&self) -> &[Color; STICKER_COUNT] {
        &self.stickers
    }

    pub fn set_sticker(&mut self, pos: StickerPos, color: Color) {
        self.stickers[pos.index()] = color;
    }

    pub fn to_cube_string(&self) -> CubeString {
        CubeString::from_colors(&self.stickers)
    }

    /// Replaces all 54 stickers, or none of them if `raw` is malformed.
    pub fn load_from_cube_string(&mut self, raw: &str) -> Result<(), CubeStringError> {
        self.stickers = CubeString::decode(raw)?;
        Ok(())
    }

    pub fn reset_to_reference(&mut self) {
        *self = Self::reference();
    }
}
