#![warn(missing_docs)]
//! Editor Cursor - Headless Multi-Cursor Engine
//!
//! # Overview
//!
//! `editor-cursor` computes where cursors and selections go in response to editing
//! operations. It does not own a renderer or an event loop: a host feeds it discrete
//! operations (keystrokes, commands, mouse gestures) and it answers with new cursor states and
//! edit commands. Text layout is abstracted behind a model/view split so the same logic works
//! with or without soft wrapping.
//!
//! # Core Features
//!
//! - **Word Navigation**: separator-aware word boundaries, configurable per editor
//! - **Tab-Aware Columns**: visible-column arithmetic with sticky columns for vertical moves
//! - **Typing Interceptors**: enter auto-indentation, auto-closing pairs, surround, electric characters
//! - **Column Selection**: rectangular selections over wrapped lines
//! - **Marker-Backed Cursors**: selections survive edits made by other cursors in the same batch
//! - **Link Detection**: `http`, `https` and `file` links in plain text
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorSession (batch execution, undo)      │  ← Reference host
//! ├─────────────────────────────────────────────┤
//! │  Cursor Operations (moves, typing, deletes) │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  OneCursor (model + view state, anchors)    │  ← Cursor state
//! ├─────────────────────────────────────────────┤
//! │  Movement / Words / Classifier              │  ← Stateless helpers
//! ├─────────────────────────────────────────────┤
//! │  DocumentModel + ViewModelHelper traits     │  ← Host seams
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_cursor::operations::CursorOperation;
//! use editor_cursor::{EditorOptions, EditorSession, Position, Selection};
//! use editor_cursor_lang::LanguageConfiguration;
//!
//! let mut session =
//!     EditorSession::new("let x = 1;", LanguageConfiguration::plain(), EditorOptions::default()).unwrap();
//!
//! session.execute(CursorOperation::MoveToEndOfLine { select: false }).unwrap();
//! assert_eq!(session.primary_selection(), Selection::collapsed(Position::new(1, 11)));
//!
//! session.execute(CursorOperation::DeleteLeft).unwrap();
//! assert_eq!(session.text(), "let x = 1");
//! ```
//!
//! # Module Description
//!
//! - [`classifier`] - dense character class tables
//! - [`words`] - word boundary search within a line
//! - [`movement`] - visible columns and stateless moves
//! - [`cursor`] - [`OneCursor`] and its model/view state
//! - [`operations`] - the cursor operation catalogue
//! - [`session`] - the multi-cursor edit executor
//! - [`links`] - link detection
//!
//! # Coordinates
//!
//! Lines and columns are 1-based; columns count UTF-16 code units, so a character outside the
//! Basic Multilingual Plane spans two columns. Visible columns are 0-based and expand tabs to
//! tab stops.

pub mod classifier;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod error;
pub mod indentation;
pub mod links;
pub mod model;
pub mod movement;
pub mod operations;
pub mod position;
pub mod session;
pub mod text_model;
pub mod view;
pub mod words;
pub mod wrapping;

pub use classifier::{CharacterClassifier, WordCharacterClass, WordCharacterClassifier};
pub use commands::TextCommand;
pub use config::{CursorConfiguration, DEFAULT_WORD_SEPARATORS, EditorOptions, ModeConfiguration};
pub use cursor::{
    BRACKET_MATCH_CLASS, CursorHost, CursorModelState, CursorState, OneCursor, SavedCursorState,
};
pub use error::CursorError;
pub use links::{Link, LinkComputerTarget, compute_line_links, compute_links};
pub use model::{
    AnchorId, DecorationId, DocumentModel, EditableDocument, LineSource, ModelDecoration,
    TextModelOptions,
};
pub use operations::{
    CursorChangeReason, CursorMoveArguments, CursorOperation, MoveTarget, MoveUnit,
    OperationContext, OperationResult,
};
pub use position::{Position, Range, Selection, SelectionDirection};
pub use session::EditorSession;
pub use text_model::TextModel;
pub use view::{IdentityViewModel, ViewLines, ViewModelHelper, Viewport};
pub use words::{FindWordResult, WordNavigationType, WordType};
pub use wrapping::{WrapIndent, WrapMode, WrapOptions, WrappedViewModel};
