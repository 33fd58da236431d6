//! In-memory display server for driving the cursor sequence in tests.
//!
//! Tracks live resources the way the server does, records every request it
//! receives and can be told to reject one kind of request.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use nullcursor::server::{
    Colormap, Cursor, GraphicsContext, Image, Pixmap, Rgb, Screen, Window, XServer,
};
use nullcursor::{ProtocolError, Request};

pub const ROOT: Window = Window(0x1e3);
pub const COLORMAP: Colormap = Colormap(0x20);
pub const WHITE_PIXEL: u64 = 0xff_ffff;
pub const BLACK_PIXEL: u64 = 0;

const BAD_VALUE: u8 = 2;
const BAD_WINDOW: u8 = 3;
const BAD_PIXMAP: u8 = 4;
const BAD_CURSOR: u8 = 6;
const BAD_MATCH: u8 = 8;
const BAD_COLOR: u8 = 12;
const BAD_GC: u8 = 13;

/// The order a successful run issues its requests in.
pub const FULL_SEQUENCE: [Request; 9] = [
    Request::CreatePixmap,
    Request::CreateGc,
    Request::PutImage,
    Request::QueryColors,
    Request::CreateCursor,
    Request::FreeGc,
    Request::FreePixmap,
    Request::ChangeWindowAttributes,
    Request::FreeCursor,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixmapRecord {
    pub drawable: Window,
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub contents: Option<Image>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorRecord {
    pub source: u64,
    pub mask: u64,
    pub foreground: Rgb,
    pub background: Rgb,
    pub hotspot: (u16, u16),
}

pub struct FakeServer {
    screen: Screen,
    next_id: u64,
    reject: Option<Request>,
    requests: Vec<Request>,
    pub colormap: HashMap<u64, Rgb>,
    pub pixmaps: HashMap<u64, PixmapRecord>,
    pub gcs: HashMap<u64, u64>,
    /// Cursor ids the client still holds.
    pub cursor_ids: HashSet<u64>,
    /// Every cursor the server keeps alive, by id.
    pub cursors: HashMap<u64, CursorRecord>,
    pub root_cursor: Option<u64>,
}

impl FakeServer {
    pub fn new() -> Self {
        let mut colormap = HashMap::new();
        colormap.insert(
            WHITE_PIXEL,
            Rgb {
                red: 0xffff,
                green: 0xffff,
                blue: 0xffff,
            },
        );
        colormap.insert(BLACK_PIXEL, Rgb::default());

        Self {
            screen: Screen {
                number: 0,
                root: ROOT,
                default_colormap: COLORMAP,
                white_pixel: WHITE_PIXEL,
                black_pixel: BLACK_PIXEL,
            },
            next_id: 0x0040_0000,
            reject: None,
            requests: Vec::new(),
            colormap,
            pixmaps: HashMap::new(),
            gcs: HashMap::new(),
            cursor_ids: HashSet::new(),
            cursors: HashMap::new(),
            root_cursor: None,
        }
    }

    pub fn rejecting(request: Request) -> Self {
        let mut server = Self::new();
        server.reject = Some(request);
        server
    }

    pub fn with_white(white_pixel: u64, white: Rgb) -> Self {
        let mut server = Self::new();
        server.screen.white_pixel = white_pixel;
        server.colormap.insert(white_pixel, white);
        server
    }

    /// Requests in the order the server received them, rejected ones included.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn white(&self) -> Rgb {
        self.colormap[&self.screen.white_pixel]
    }

    fn receive(&mut self, request: Request) -> Result<(), ProtocolError> {
        self.requests.push(request);

        if self.reject == Some(request) {
            return Err(error(BAD_MATCH, request, 0));
        }

        Ok(())
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn collect_cursors(&mut self) {
        let root_cursor = self.root_cursor;
        let held = &self.cursor_ids;
        self.cursors
            .retain(|id, _| held.contains(id) || root_cursor == Some(*id));
    }
}

fn error(error_code: u8, request: Request, resource: u64) -> ProtocolError {
    ProtocolError {
        error_code,
        major_code: request.opcode(),
        minor_code: 0,
        resource,
    }
}

impl XServer for FakeServer {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn create_pixmap(
        &mut self,
        drawable: Window,
        width: u16,
        height: u16,
        depth: u8,
    ) -> Result<Pixmap, ProtocolError> {
        self.receive(Request::CreatePixmap)?;

        if drawable != self.screen.root {
            return Err(error(BAD_WINDOW, Request::CreatePixmap, drawable.0));
        }
        if width == 0 || height == 0 || depth == 0 {
            return Err(error(BAD_VALUE, Request::CreatePixmap, 0));
        }

        let id = self.allocate();
        self.pixmaps.insert(
            id,
            PixmapRecord {
                drawable,
                width,
                height,
                depth,
                contents: None,
            },
        );

        Ok(Pixmap::from_raw(id))
    }

    fn create_gc(&mut self, drawable: &Pixmap) -> Result<GraphicsContext, ProtocolError> {
        self.receive(Request::CreateGc)?;

        if !self.pixmaps.contains_key(&drawable.raw()) {
            return Err(error(BAD_PIXMAP, Request::CreateGc, drawable.raw()));
        }

        let id = self.allocate();
        self.gcs.insert(id, drawable.raw());

        Ok(GraphicsContext::from_raw(id))
    }

    fn put_image(
        &mut self,
        drawable: &Pixmap,
        gc: &GraphicsContext,
        image: &Image,
    ) -> Result<(), ProtocolError> {
        self.receive(Request::PutImage)?;

        if !self.gcs.contains_key(&gc.raw()) {
            return Err(error(BAD_GC, Request::PutImage, gc.raw()));
        }
        let pixmap = self
            .pixmaps
            .get_mut(&drawable.raw())
            .ok_or_else(|| error(BAD_PIXMAP, Request::PutImage, drawable.raw()))?;
        if image.depth != pixmap.depth
            || image.data.len() < image.bytes_per_line() * usize::from(image.height)
        {
            return Err(error(BAD_MATCH, Request::PutImage, drawable.raw()));
        }

        pixmap.contents = Some(image.clone());
        Ok(())
    }

    fn query_color(&mut self, colormap: Colormap, pixel: u64) -> Result<Rgb, ProtocolError> {
        self.receive(Request::QueryColors)?;

        if colormap != self.screen.default_colormap {
            return Err(error(BAD_COLOR, Request::QueryColors, colormap.0));
        }

        self.colormap
            .get(&pixel)
            .copied()
            .ok_or_else(|| error(BAD_VALUE, Request::QueryColors, pixel))
    }

    fn create_cursor(
        &mut self,
        source: &Pixmap,
        mask: &Pixmap,
        foreground: Rgb,
        background: Rgb,
        x: u16,
        y: u16,
    ) -> Result<Cursor, ProtocolError> {
        self.receive(Request::CreateCursor)?;

        for pixmap in [source, mask] {
            match self.pixmaps.get(&pixmap.raw()) {
                Some(record) if record.depth == 1 => {}
                Some(_) => return Err(error(BAD_MATCH, Request::CreateCursor, pixmap.raw())),
                None => return Err(error(BAD_PIXMAP, Request::CreateCursor, pixmap.raw())),
            }
        }

        let id = self.allocate();
        self.cursor_ids.insert(id);
        self.cursors.insert(
            id,
            CursorRecord {
                source: source.raw(),
                mask: mask.raw(),
                foreground,
                background,
                hotspot: (x, y),
            },
        );

        Ok(Cursor::from_raw(id))
    }

    fn set_window_cursor(&mut self, window: Window, cursor: &Cursor) -> Result<(), ProtocolError> {
        self.receive(Request::ChangeWindowAttributes)?;

        if window != self.screen.root {
            return Err(error(BAD_WINDOW, Request::ChangeWindowAttributes, window.0));
        }
        if !self.cursor_ids.contains(&cursor.raw()) {
            return Err(error(BAD_CURSOR, Request::ChangeWindowAttributes, cursor.raw()));
        }

        self.root_cursor = Some(cursor.raw());
        self.collect_cursors();
        Ok(())
    }

    fn free_gc(&mut self, gc: GraphicsContext) -> Result<(), ProtocolError> {
        self.receive(Request::FreeGc)?;

        self.gcs
            .remove(&gc.raw())
            .map(|_| ())
            .ok_or_else(|| error(BAD_GC, Request::FreeGc, gc.raw()))
    }

    fn free_pixmap(&mut self, pixmap: Pixmap) -> Result<(), ProtocolError> {
        self.receive(Request::FreePixmap)?;

        self.pixmaps
            .remove(&pixmap.raw())
            .map(|_| ())
            .ok_or_else(|| error(BAD_PIXMAP, Request::FreePixmap, pixmap.raw()))
    }

    fn free_cursor(&mut self, cursor: Cursor) -> Result<(), ProtocolError> {
        self.receive(Request::FreeCursor)?;

        if !self.cursor_ids.remove(&cursor.raw()) {
            return Err(error(BAD_CURSOR, Request::FreeCursor, cursor.raw()));
        }

        self.collect_cursors();
        Ok(())
    }
}
