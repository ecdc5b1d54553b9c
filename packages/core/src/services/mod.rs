pub mod directory;
pub mod location;
pub mod mock_directory;
