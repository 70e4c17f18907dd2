pub mod app;
mod commands;
mod dispatch;
mod env;
mod info;
mod manage;
mod output;
mod runtime;
mod serve;
