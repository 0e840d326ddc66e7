// Service exports
pub mod completion;
pub mod conversations;
pub mod firestore;
pub mod fixtures;
pub mod gemini;
pub mod memory;
pub mod repository;
pub mod store;

pub use completion::{CompletionError, TextCompletion};
pub use conversations::ConversationStore;
pub use firestore::FirestoreClient;
pub use gemini::{GeminiClient, GenerationOptions};
pub use memory::MemoryStore;
pub use repository::{FoodRepository, RecordKind};
pub use store::{Document, DocumentStore, StoreError};
