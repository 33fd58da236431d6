use crate::error::ProtocolError;

/// A window owned by the server, such as the root window of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colormap(pub u64);

/// An off-screen raster surface. Freed by value, so it cannot be used afterwards.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Pixmap(u64);

/// Drawing state bound to a drawable.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct GraphicsContext(u64);

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Cursor(u64);

macro_rules! resource_id {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                /// Wraps an identifier the server has just accepted a create request for.
                pub fn from_raw(id: u64) -> Self {
                    Self(id)
                }

                pub fn raw(&self) -> u64 {
                    self.0
                }
            }
        )*
    };
}

resource_id!(Pixmap, GraphicsContext, Cursor);

/// Metadata of the default screen, borrowed from the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub number: i32,
    pub root: Window,
    pub default_colormap: Colormap,
    pub white_pixel: u64,
    pub black_pixel: u64,
}

/// A color resolved from a colormap, 16 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    XyBitmap,
}

/// Image data for a single put-image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub format: ImageFormat,
    pub width: u16,
    pub height: u16,
    pub dst_x: i16,
    pub dst_y: i16,
    pub left_pad: u8,
    pub depth: u8,
    pub data: Vec<u8>,
}

impl Image {
    /// Scanlines of bitmap data are padded to 32 bits.
    pub const SCANLINE_PAD: u32 = 32;

    /// A 1x1 bitmap at (0, 0) whose only scanline holds `pixel`.
    pub fn single_pixel(pixel: u32) -> Self {
        Self {
            format: ImageFormat::XyBitmap,
            width: 1,
            height: 1,
            dst_x: 0,
            dst_y: 0,
            left_pad: 0,
            depth: 1,
            data: pixel.to_ne_bytes().to_vec(),
        }
    }

    pub fn bytes_per_line(&self) -> usize {
        let bits = u32::from(self.width) + u32::from(self.left_pad);
        (bits.div_ceil(Self::SCANLINE_PAD) * Self::SCANLINE_PAD / 8) as usize
    }
}

/// The requests the display server connection has to support. Every method is
/// a checked request: it returns only after the server has processed it, and
/// fails with the error reply if there was one.
pub trait XServer {
    fn screen(&self) -> &Screen;

    fn create_pixmap(
        &mut self,
        drawable: Window,
        width: u16,
        height: u16,
        depth: u8,
    ) -> Result<Pixmap, ProtocolError>;

    /// Creates a context with every attribute left at its default.
    fn create_gc(&mut self, drawable: &Pixmap) -> Result<GraphicsContext, ProtocolError>;

    fn put_image(
        &mut self,
        drawable: &Pixmap,
        gc: &GraphicsContext,
        image: &Image,
    ) -> Result<(), ProtocolError>;

    fn query_color(&mut self, colormap: Colormap, pixel: u64) -> Result<Rgb, ProtocolError>;

    fn create_cursor(
        &mut self,
        source: &Pixmap,
        mask: &Pixmap,
        foreground: Rgb,
        background: Rgb,
        x: u16,
        y: u16,
    ) -> Result<Cursor, ProtocolError>;

    /// Changes only the cursor attribute of `window`.
    fn set_window_cursor(&mut self, window: Window, cursor: &Cursor) -> Result<(), ProtocolError>;

    fn free_gc(&mut self, gc: GraphicsContext) -> Result<(), ProtocolError>;

    fn free_pixmap(&mut self, pixmap: Pixmap) -> Result<(), ProtocolError>;

    /// Drops the client's reference to the cursor. The server keeps the cursor
    /// itself alive for as long as a window attribute refers to it.
    fn free_cursor(&mut self, cursor: Cursor) -> Result<(), ProtocolError>;
}
