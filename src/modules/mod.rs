//! Built-in feature modules and their registration.

pub mod ai_chat;
pub mod image_viewer;
pub mod notepad;
pub mod path_prompt;
pub mod pdf_viewer;

use std::path::{Path, PathBuf};

pub use ai_chat::AiChat;
pub use image_viewer::ImageViewer;
pub use notepad::Notepad;
pub use pdf_viewer::PdfViewer;

use crate::bus::{topics, BusMessage};
use crate::error::ConfigError;
use crate::registry::{ModuleDescriptor, ModuleRegistry};

pub const NOTEPAD: &str = "notepad";
pub const IMAGE_VIEWER: &str = "image_viewer";
pub const PDF_VIEWER: &str = "pdf_viewer";
pub const AI_CHAT: &str = "ai_chat";

/// Register the built-in modules in navigation order.
pub fn register_builtin(registry: &mut ModuleRegistry) -> Result<(), ConfigError> {
    registry.register(ModuleDescriptor::new(NOTEPAD, "Notepad", "📝", || {
        Box::new(Notepad::new())
    }))?;
    registry.register(ModuleDescriptor::new(IMAGE_VIEWER, "Image Viewer", "🖼", || {
        Box::new(ImageViewer::new())
    }))?;
    registry.register(ModuleDescriptor::new(PDF_VIEWER, "PDF Viewer", "📄", || {
        Box::new(PdfViewer::new())
    }))?;
    registry.register(ModuleDescriptor::new(AI_CHAT, "AI Chat", "💬", || {
        Box::new(AiChat::new())
    }))?;
    Ok(())
}

impl ModuleRegistry {
    pub fn with_builtin_modules() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        register_builtin(&mut registry)?;
        Ok(registry)
    }
}

/// Messages that open `path` in the module that handles its file type.
///
/// The activation comes first so the target is mounted when the open arrives.
pub fn open_file_messages(path: &Path) -> [BusMessage; 2] {
    let (module, topic) = if image_viewer::is_image_path(path) {
        (IMAGE_VIEWER, topics::IMAGE_OPEN)
    } else if pdf_viewer::is_pdf_path(path) {
        (PDF_VIEWER, topics::PDF_OPEN)
    } else {
        (NOTEPAD, topics::TEXT_OPEN)
    };
    [
        BusMessage::activate(module),
        BusMessage::new(topic, PathBuf::from(path)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = ModuleRegistry::with_builtin_modules().unwrap();
        assert_eq!(registry.ids(), vec![NOTEPAD, IMAGE_VIEWER, PDF_VIEWER, AI_CHAT]);
        assert_eq!(registry.resolve(AI_CHAT).unwrap().label(), "💬 AI Chat");
    }

    #[test]
    fn test_registering_builtins_twice_fails() {
        let mut registry = ModuleRegistry::with_builtin_modules().unwrap();
        assert_eq!(
            register_builtin(&mut registry),
            Err(ConfigError::DuplicateIdentifier(NOTEPAD.into()))
        );
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_open_file_routing() {
        let [activate, open] = open_file_messages(Path::new("/tmp/cat.JPG"));
        assert_eq!(activate.payload::<String>().map(String::as_str), Some(IMAGE_VIEWER));
        assert!(open.is(topics::IMAGE_OPEN));

        let [activate, open] = open_file_messages(Path::new("paper.pdf"));
        assert_eq!(activate.payload::<String>().map(String::as_str), Some(PDF_VIEWER));
        assert_eq!(open.payload::<PathBuf>(), Some(&PathBuf::from("paper.pdf")));

        let [activate, open] = open_file_messages(Path::new("README"));
        assert_eq!(activate.payload::<String>().map(String::as_str), Some(NOTEPAD));
        assert!(open.is(topics::TEXT_OPEN));
    }
}
