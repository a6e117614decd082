mod fixtures;
mod mocks;

mod groups;
mod inbox;
