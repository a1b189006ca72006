//! Pipeline stages for document risk analysis.
//!
//! Each submodule implements one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌──▶ pdf ───────────┐
//! input ─────┤                   ├──▶ prompts ──▶ llm
//! (upload)   └──▶ image ──▶ ocr ─┘    (template)   (completion)
//! ```
//!
//! 1. [`input`] — read a local file into an [`crate::upload::Upload`]
//! 2. [`pdf`]   — per-page text layer via pdfium; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`image`] — decode PNG/JPEG bytes into a pixel buffer
//! 4. [`ocr`]   — hand the pixel buffer to an OCR engine (Tesseract by default)
//! 5. [`llm`]   — one chat-completion call; the only stage with network I/O

pub mod image;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod pdf;
