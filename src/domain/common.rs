use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Records scoped to the signed-in user who created them.
pub trait UserScoped {
    fn user_id(&self) -> &str;

    fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id() == user_id
    }
}

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use rust_decimal;
pub use serde;
pub use uuid;
