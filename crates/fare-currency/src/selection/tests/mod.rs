mod alternate;
mod common;
mod routing;
