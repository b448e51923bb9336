mod fuzz_run;
mod lifecycle;
