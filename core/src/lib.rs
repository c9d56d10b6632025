//! Deck generation: outline sources, image resolution, slide templates and
//! the presentation package writer.

pub mod assembler;
pub mod client;
pub mod convert;
pub mod deck;
pub mod error;
pub mod images;
pub mod pptx;
pub mod render;
pub mod templates;

pub use assembler::{DeckAssembler, GenerationEvent, GenerationReport, GenerationRequest};
pub use client::{OutlineSource, StaticOutline};
pub use convert::{PdfConvert, PdfConverter};
pub use deck::Deck;
pub use error::{ErrorReporter, Result, SlideError};
pub use images::{HttpImageFetcher, ImageFetch, ImageSearch, UnsplashClient};
