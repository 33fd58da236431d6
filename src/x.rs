use std::collections::HashMap;
use std::ffi::{c_void, CString};
use std::mem;
use std::ptr;
use std::sync::Mutex;

use libc::{c_char, c_int, c_uint, c_ulong};
use x11::xlib;

use crate::config::Config;
use crate::error::{Error, ProtocolError, Request};
use crate::server::{
    Colormap, Cursor, GraphicsContext, Image, ImageFormat, Pixmap, Rgb, Screen, Window, XServer,
};

/// First error reported by the server since the last checked request.
static PENDING_ERROR: Mutex<Option<ProtocolError>> = Mutex::new(None);

/// Xlib connection whose requests are all checked with a round trip.
pub struct Display {
    raw: *mut xlib::Display,
    screen: Screen,
    gcs: HashMap<u64, xlib::GC>,
}

impl Display {
    pub fn open(config: &Config) -> Result<Self, Error> {
        unsafe {
            xlib::XSetErrorHandler(Some(Self::error_handler));
        }

        let connection_error = || Error::Connection {
            display: config.display_name.clone(),
        };

        let c_display_name =
            CString::new(config.display_name.as_str()).map_err(|_| connection_error())?;
        let raw = unsafe { xlib::XOpenDisplay(c_display_name.as_ptr()) };

        if raw.is_null() {
            return Err(connection_error());
        }

        // From here on `display` owns the connection, so early returns close it.
        let mut display = Self {
            raw,
            screen: Screen {
                number: 0,
                root: Window(0),
                default_colormap: Colormap(0),
                white_pixel: 0,
                black_pixel: 0,
            },
            gcs: HashMap::new(),
        };
        display.screen = display.default_screen()?;

        log::debug!(
            "connected to {}, screen {} root {:#x}",
            config.display_name,
            display.screen.number,
            display.screen.root.0
        );

        Ok(display)
    }

    fn default_screen(&self) -> Result<Screen, Error> {
        unsafe {
            let number = xlib::XDefaultScreen(self.raw);
            let screen = xlib::XScreenOfDisplay(self.raw, number);

            if screen.is_null() {
                return Err(Error::ScreenResolution);
            }

            Ok(Screen {
                number,
                root: Window(xlib::XRootWindowOfScreen(screen) as u64),
                default_colormap: Colormap(xlib::XDefaultColormapOfScreen(screen) as u64),
                white_pixel: xlib::XWhitePixelOfScreen(screen) as u64,
                black_pixel: xlib::XBlackPixelOfScreen(screen) as u64,
            })
        }
    }

    /// Waits until the server has processed every request sent so far and
    /// returns the error it reported, if any.
    fn check(&self) -> Result<(), ProtocolError> {
        unsafe {
            xlib::XSync(self.raw, 0);
        }

        match PENDING_ERROR.lock() {
            Ok(mut pending) => pending.take().map_or(Ok(()), Err),
            Err(poisoned) => poisoned.into_inner().take().map_or(Ok(()), Err),
        }
    }

    unsafe extern "C" fn error_handler(
        _display: *mut xlib::Display,
        e: *mut xlib::XErrorEvent,
    ) -> c_int {
        let error = ProtocolError {
            error_code: (*e).error_code,
            major_code: (*e).request_code,
            minor_code: (*e).minor_code,
            resource: (*e).resourceid as u64,
        };

        log::error!(
            "X11 Error: code {} (request code: {}, minor code: {}, resource id: {:#x})",
            error.error_code,
            error.major_code,
            error.minor_code,
            error.resource
        );

        if let Ok(mut pending) = PENDING_ERROR.lock() {
            pending.get_or_insert(error);
        }

        0
    }
}

fn to_xcolor(color: Rgb) -> xlib::XColor {
    let mut xcolor: xlib::XColor = unsafe { mem::zeroed() };
    xcolor.red = color.red;
    xcolor.green = color.green;
    xcolor.blue = color.blue;
    xcolor.flags = (xlib::DoRed | xlib::DoGreen | xlib::DoBlue) as c_char;
    xcolor
}

impl XServer for Display {
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
        let id = unsafe {
            xlib::XCreatePixmap(
                self.raw,
                drawable.0 as c_ulong,
                c_uint::from(width),
                c_uint::from(height),
                c_uint::from(depth),
            )
        };
        self.check()?;

        Ok(Pixmap::from_raw(id as u64))
    }

    fn create_gc(&mut self, drawable: &Pixmap) -> Result<GraphicsContext, ProtocolError> {
        let gc = unsafe { xlib::XCreateGC(self.raw, drawable.raw() as c_ulong, 0, ptr::null_mut()) };
        if gc.is_null() {
            return Err(ProtocolError::alloc_failed(Request::CreateGc));
        }
        self.check()?;

        let id = unsafe { xlib::XGContextFromGC(gc) } as u64;
        self.gcs.insert(id, gc);

        Ok(GraphicsContext::from_raw(id))
    }

    fn put_image(
        &mut self,
        drawable: &Pixmap,
        gc: &GraphicsContext,
        image: &Image,
    ) -> Result<(), ProtocolError> {
        let xgc = *self
            .gcs
            .get(&gc.raw())
            .ok_or_else(|| ProtocolError::bad_gc(Request::PutImage, gc.raw()))?;

        let format = match image.format {
            ImageFormat::XyBitmap => xlib::XYBitmap,
        };

        // Xlib only borrows the buffer; it is detached again before the XImage is freed.
        let mut data = image.data.clone();

        unsafe {
            let ximage = xlib::XCreateImage(
                self.raw,
                xlib::XDefaultVisual(self.raw, self.screen.number),
                c_uint::from(image.depth),
                format,
                c_int::from(image.left_pad),
                data.as_mut_ptr() as *mut c_char,
                c_uint::from(image.width),
                c_uint::from(image.height),
                Image::SCANLINE_PAD as c_int,
                image.bytes_per_line() as c_int,
            );

            if ximage.is_null() {
                return Err(ProtocolError::alloc_failed(Request::PutImage));
            }

            xlib::XPutImage(
                self.raw,
                drawable.raw() as c_ulong,
                xgc,
                ximage,
                0,
                0,
                c_int::from(image.dst_x),
                c_int::from(image.dst_y),
                c_uint::from(image.width),
                c_uint::from(image.height),
            );

            (*ximage).data = ptr::null_mut();
            xlib::XFree(ximage as *mut c_void);
        }

        self.check()
    }

    fn query_color(&mut self, colormap: Colormap, pixel: u64) -> Result<Rgb, ProtocolError> {
        let mut color: xlib::XColor = unsafe { mem::zeroed() };
        color.pixel = pixel as c_ulong;

        unsafe {
            xlib::XQueryColor(self.raw, colormap.0 as c_ulong, &mut color);
        }
        self.check()?;

        Ok(Rgb {
            red: color.red,
            green: color.green,
            blue: color.blue,
        })
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
        let mut fg = to_xcolor(foreground);
        let mut bg = to_xcolor(background);

        let id = unsafe {
            xlib::XCreatePixmapCursor(
                self.raw,
                source.raw() as c_ulong,
                mask.raw() as c_ulong,
                &mut fg,
                &mut bg,
                c_uint::from(x),
                c_uint::from(y),
            )
        };
        self.check()?;

        Ok(Cursor::from_raw(id as u64))
    }

    fn set_window_cursor(&mut self, window: Window, cursor: &Cursor) -> Result<(), ProtocolError> {
        let mut attributes: xlib::XSetWindowAttributes = unsafe { mem::zeroed() };
        attributes.cursor = cursor.raw() as c_ulong;

        unsafe {
            xlib::XChangeWindowAttributes(
                self.raw,
                window.0 as c_ulong,
                xlib::CWCursor as c_ulong,
                &mut attributes,
            );
        }

        self.check()
    }

    fn free_gc(&mut self, gc: GraphicsContext) -> Result<(), ProtocolError> {
        let xgc = self
            .gcs
            .remove(&gc.raw())
            .ok_or_else(|| ProtocolError::bad_gc(Request::FreeGc, gc.raw()))?;

        unsafe {
            xlib::XFreeGC(self.raw, xgc);
        }

        self.check()
    }

    fn free_pixmap(&mut self, pixmap: Pixmap) -> Result<(), ProtocolError> {
        unsafe {
            xlib::XFreePixmap(self.raw, pixmap.raw() as c_ulong);
        }

        self.check()
    }

    fn free_cursor(&mut self, cursor: Cursor) -> Result<(), ProtocolError> {
        unsafe {
            xlib::XFreeCursor(self.raw, cursor.raw() as c_ulong);
        }

        self.check()
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.raw);
        }
    }
}
