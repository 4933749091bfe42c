mod accounts;
mod client;
mod link_delete;
mod login;
