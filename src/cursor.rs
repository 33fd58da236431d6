use crate::error::{Error, Request, Result};
use crate::server::{Cursor, GraphicsContext, Image, Pixmap, Rgb, Screen, XServer};

/// Creates the 1x1 pixmap of depth 1 the cursor is built from. The root window
/// only supplies the screen; nothing is drawn into it.
pub fn create_pixmap<S: XServer>(server: &mut S, screen: &Screen) -> Result<Pixmap> {
    let pixmap = server
        .create_pixmap(screen.root, 1, 1, 1)
        .map_err(|error| Error::ResourceCreation {
            request: Request::CreatePixmap,
            error,
        })?;

    log::debug!("created pixmap {:#x}", pixmap.raw());
    Ok(pixmap)
}

pub fn create_gc<S: XServer>(server: &mut S, pixmap: &Pixmap) -> Result<GraphicsContext> {
    let gc = server
        .create_gc(pixmap)
        .map_err(|error| Error::ResourceCreation {
            request: Request::CreateGc,
            error,
        })?;

    log::debug!("created gc {:#x} for pixmap {:#x}", gc.raw(), pixmap.raw());
    Ok(gc)
}

/// Writes `pixel` into the only pixel of `pixmap`.
pub fn fill_pixmap<S: XServer>(
    server: &mut S,
    pixmap: &Pixmap,
    gc: &GraphicsContext,
    pixel: u32,
) -> Result<()> {
    server
        .put_image(pixmap, gc, &Image::single_pixel(pixel))
        .map_err(|error| Error::Draw {
            request: Request::PutImage,
            error,
        })?;

    log::debug!("filled pixmap {:#x} with {:#x}", pixmap.raw(), pixel);
    Ok(())
}

/// Looks up what the screen's white pixel means in its default colormap.
pub fn query_white<S: XServer>(server: &mut S, screen: &Screen) -> Result<Rgb> {
    let color = server
        .query_color(screen.default_colormap, screen.white_pixel)
        .map_err(|error| Error::ColorLookup {
            request: Request::QueryColors,
            error,
        })?;

    log::debug!(
        "white pixel {:#x} is rgb({:#06x}, {:#06x}, {:#06x})",
        screen.white_pixel,
        color.red,
        color.green,
        color.blue
    );
    Ok(color)
}

/// A cursor with identical foreground and background colors, which renders
/// as nothing whatever its bitmap holds.
#[derive(Debug)]
pub struct NullCursor {
    cursor: Cursor,
    color: Rgb,
}

impl NullCursor {
    pub fn create<S: XServer>(server: &mut S) -> Result<Self> {
        let white_pixel = server.screen().white_pixel;
        // The pixmap holds a single 32-bit scanline.
        Self::create_with_fill(server, white_pixel as u32)
    }

    /// Builds the cursor from a pixmap filled with `pixel`. The value only has
    /// to be valid; the cursor colors come from the colormap lookup.
    pub fn create_with_fill<S: XServer>(server: &mut S, pixel: u32) -> Result<Self> {
        let screen = *server.screen();

        let pixmap = create_pixmap(server, &screen)?;
        let gc = create_gc(server, &pixmap)?;
        fill_pixmap(server, &pixmap, &gc, pixel)?;
        let color = query_white(server, &screen)?;

        let cursor = server
            .create_cursor(&pixmap, &pixmap, color, color, 0, 0)
            .map_err(|error| Error::ResourceCreation {
                request: Request::CreateCursor,
                error,
            })?;

        log::debug!("created cursor {:#x}", cursor.raw());

        server.free_gc(gc).map_err(|error| Error::ResourceRelease {
            request: Request::FreeGc,
            error,
        })?;
        server
            .free_pixmap(pixmap)
            .map_err(|error| Error::ResourceRelease {
                request: Request::FreePixmap,
                error,
            })?;

        Ok(Self { cursor, color })
    }

    pub fn id(&self) -> u64 {
        self.cursor.raw()
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Installs the cursor on the root window and gives up the local
    /// reference. Returns the cursor id now held by the root window.
    pub fn attach_to_root<S: XServer>(self, server: &mut S) -> Result<u64> {
        let root = server.screen().root;

        server
            .set_window_cursor(root, &self.cursor)
            .map_err(|error| Error::AttributeChange {
                request: Request::ChangeWindowAttributes,
                error,
            })?;

        log::info!("root window {:#x} now uses cursor {:#x}", root.0, self.id());

        self.release(server)
    }

    /// Frees only the client's handle. The cursor stays on the server for as
    /// long as the root window refers to it, which outlives this process.
    fn release<S: XServer>(self, server: &mut S) -> Result<u64> {
        let id = self.id();

        server
            .free_cursor(self.cursor)
            .map_err(|error| Error::ResourceRelease {
                request: Request::FreeCursor,
                error,
            })?;

        Ok(id)
    }
}
