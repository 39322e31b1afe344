//! # Turkey POS Installments
//!
//! Storefront widget core for Turkish virtual-POS checkouts. Detects the card
//! brand and issuing bank from the typed digits, fetches the installment plans the
//! backend offers for that bank or provider, and keeps the displayed total and the
//! checkout installment fee in sync with the shopper's choice.
//!
//! The host page owns the DOM and the event loop. It builds an
//! [`widget::InstallmentWidget`] with a backend ([`rpc::InstallmentBackend`]) and a
//! view ([`view::InstallmentView`]) and forwards input events to it.

pub mod card;
pub mod config;
pub mod consts;
pub mod errors;
pub mod logger;
pub mod models;
pub mod rpc;
pub mod selector;
pub mod view;
pub mod widget;
