pub mod feed;
pub mod grid;
pub mod guards;
pub mod planner;
pub mod proximity;
pub mod recommend;
