use std::fmt;

use thiserror::Error;

/// Protocol requests issued while building and installing the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    CreatePixmap,
    CreateGc,
    PutImage,
    QueryColors,
    CreateCursor,
    ChangeWindowAttributes,
    FreeGc,
    FreePixmap,
    FreeCursor,
}

impl Request {
    /// Core protocol major opcode of the request.
    pub fn opcode(self) -> u8 {
        match self {
            Request::ChangeWindowAttributes => 2,
            Request::CreatePixmap => 53,
            Request::FreePixmap => 54,
            Request::CreateGc => 55,
            Request::FreeGc => 60,
            Request::PutImage => 72,
            Request::QueryColors => 91,
            Request::CreateCursor => 93,
            Request::FreeCursor => 95,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Request::CreatePixmap => "create_pixmap",
            Request::CreateGc => "create_gc",
            Request::PutImage => "put_image",
            Request::QueryColors => "query_colors",
            Request::CreateCursor => "create_cursor",
            Request::ChangeWindowAttributes => "change_window_attributes",
            Request::FreeGc => "free_gc",
            Request::FreePixmap => "free_pixmap",
            Request::FreeCursor => "free_cursor",
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error reply reported by the server for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolError {
    pub error_code: u8,
    pub major_code: u8,
    pub minor_code: u8,
    pub resource: u64,
}

impl ProtocolError {
    /// BadAlloc
    pub const BAD_ALLOC: u8 = 11;
    /// BadGC
    pub const BAD_GC: u8 = 13;

    /// Allocation failure on the client side, attributed to `request`.
    pub fn alloc_failed(request: Request) -> Self {
        Self {
            error_code: Self::BAD_ALLOC,
            major_code: request.opcode(),
            minor_code: 0,
            resource: 0,
        }
    }

    /// `gc` is not a context this connection created.
    pub fn bad_gc(request: Request, gc: u64) -> Self {
        Self {
            error_code: Self::BAD_GC,
            major_code: request.opcode(),
            minor_code: 0,
            resource: gc,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error {} (opcode {}:{}, resource {:#x})",
            self.error_code, self.minor_code, self.major_code, self.resource
        )
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot open display {display}")]
    Connection { display: String },

    #[error("cannot obtain default screen")]
    ScreenResolution,

    #[error("{request}: {error}")]
    ResourceCreation { request: Request, error: ProtocolError },

    #[error("{request}: {error}")]
    Draw { request: Request, error: ProtocolError },

    #[error("{request}: {error}")]
    ColorLookup { request: Request, error: ProtocolError },

    #[error("{request}: {error}")]
    AttributeChange { request: Request, error: ProtocolError },

    #[error("{request}: {error}")]
    ResourceRelease { request: Request, error: ProtocolError },
}

impl Error {
    /// The request the server rejected, if the failure came from the server.
    pub fn request(&self) -> Option<Request> {
        match self {
            Error::Connection { .. } | Error::ScreenResolution => None,
            Error::ResourceCreation { request, .. }
            | Error::Draw { request, .. }
            | Error::ColorLookup { request, .. }
            | Error::AttributeChange { request, .. }
            | Error::ResourceRelease { request, .. } => Some(*request),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
