mod pipeline;
mod wiring;
