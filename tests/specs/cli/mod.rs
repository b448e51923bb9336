mod help;
mod unreachable;
