use uuid::Uuid;

pub mod member;
pub mod product;

// Re-exports for convenience
pub use member::*;
pub use product::*;

// Helper function to generate record ids in the format stored in the database
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
