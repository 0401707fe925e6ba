// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer, mouse and touch dispatch for `strata` scenes.
//!
//! - [`normalize`](normalize()) turns platform notifications into
//!   [`PointerInput`]s, one per pointer id.
//! - [`Dispatcher`] runs a per-pointer state machine over a
//!   [`HitTest`](strata_core::host::HitTest) host: hover tracking with
//!   pointer-over and pointer-out, presses, drag capture, click synthesis
//!   by button, double clicks, wheel and global events, cursor overrides,
//!   and touch-session gesture cancellation.
//!
//! Events bubble from the hit node through its interactive ancestors until
//! a handler returns [`Propagation::Stop`].
//!
//! # Crate features
//!
//! - `trace` (disabled by default): [`Dispatcher::handle_traced`] reports
//!   every delivery to the given sink.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod dispatcher;
mod normalize;

pub use dispatcher::{
    Cursor, DispatchConfig, DispatchOutcome, Dispatcher, EventKind, PointerEvent, Propagation,
    SubscriptionId, TouchSession,
};
pub use normalize::{
    Button, MOUSE_POINTER_ID, MouseAction, Phase, PointerInput, PointerKind, RawInput,
    TouchAction, TouchPoint, normalize, touch_pointer_id,
};
