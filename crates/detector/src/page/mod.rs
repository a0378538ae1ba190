//! Page-context components
//!
//! Everything that runs in the page's execution context: the extraction
//! agent that scrapes the surface and the annotation engine that renders
//! badges and the detail popup. The page markup itself stays opaque
//! behind [`PageSurface`].

mod agent;
mod annotate;
mod fixture;
mod surface;

pub use agent::PageAgent;
pub use annotate::{AnnotationEngine, Badge, DetailPopup, HAM_COLOR, SPAM_COLOR};
pub use fixture::{FixturePage, FixtureRow};
pub use surface::PageSurface;
