// Application layer - Use case interactors

pub mod batch_interactor;
pub mod container;
pub mod edit_interactor;
pub mod merge_interactor;
pub mod overwrite;

// Re-export interactors
pub use batch_interactor::{collect_inputs, BatchInteractor, OutputTarget};
pub use edit_interactor::EditInteractor;
pub use merge_interactor::MergeInteractor;
pub use overwrite::OverwriteGate;
