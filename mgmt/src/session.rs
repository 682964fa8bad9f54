// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Session subsystem request handling: Display and Count.

use std::ops::ControlFlow;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, error};

use sessiondb::{SessionDb, WalkOutcome};

use crate::buffer::{PushOutcome, ResponseBuffer};
use crate::error::ChannelError;
use crate::reply::Reply;
use crate::request::{OPERATION_HEADER_SIZE, Operation, SessionRequest};
use crate::view::SessionView;
use crate::xlator::{ChannelConfig, RequestContext, Xlator};

/// Handle one session-table control message and produce its reply.
///
/// Exactly one reply comes back for every input, valid or not. A stateless
/// translator rejects the whole subsystem before anything else is looked
/// at; then the payload size is validated, then the operation code routes
/// to Display or Count.
pub fn handle_session_request(
    xlator: &Xlator,
    config: &ChannelConfig,
    ctx: &RequestContext,
    raw: &[u8],
) -> Reply {
    let Some(db) = xlator.sessions() else {
        error!("stateless translators keep no session table");
        return Reply::error(&ChannelError::NotApplicable);
    };
    if raw.len() < OPERATION_HEADER_SIZE {
        debug!("session request shorter than its operation header");
        return Reply::error(&ChannelError::MalformedRequest);
    }
    let (header, body) = raw.split_at(OPERATION_HEADER_SIZE);
    let request = match SessionRequest::decode(body) {
        Ok(request) => request,
        Err(e) => return Reply::error(&e),
    };
    let op_code = u16::from_be_bytes([header[0], header[1]]);
    match Operation::try_from(op_code) {
        Ok(Operation::Display) => handle_display(db, config, ctx, &request),
        Ok(Operation::Count) => handle_count(db, &request),
        Err(e) => {
            error!("unknown session operation: {op_code}");
            Reply::error(&e)
        }
    }
}

/// Stream one page of the session table.
///
/// Projected records are packed into a buffer bounded by the channel's
/// maximum reply size; when the next record would not fit, enumeration
/// stops and the reply is flagged as having more data pending, to be
/// resumed from the last packed record's `(remote4, local4)` key. A walker
/// fault or projection failure discards the partial page and turns into an
/// error reply instead.
fn handle_display(
    db: &SessionDb,
    config: &ChannelConfig,
    ctx: &RequestContext,
    request: &SessionRequest,
) -> Reply {
    if !ctx.privileged() {
        return Reply::error(&ChannelError::PermissionDenied);
    }

    debug!("sending {} session table to userspace", request.proto());

    let mut buffer = match ResponseBuffer::new(config.max_reply_size()) {
        Ok(buffer) => buffer,
        Err(e) => return Reply::error(&e),
    };

    let now = Instant::now();
    let outcome = db.foreach(request.proto(), request.resume(), |entry| {
        let view = SessionView::project(entry, now)?;
        Ok(match buffer.push(&view.to_bytes()) {
            PushOutcome::Written => ControlFlow::Continue(()),
            PushOutcome::WouldOverflow => ControlFlow::Break(()),
        })
    });

    match outcome {
        Ok(walk) => {
            buffer.set_pending(walk == WalkOutcome::Stopped);
            buffer.into_reply()
        }
        // The partial page is dropped with the buffer.
        Err(e) => Reply::error(&e),
    }
}

/// Report the number of live sessions for one protocol.
///
/// Deliberately unprivileged: the count is a single scalar that exposes no
/// addressing data, unlike the Display dump.
fn handle_count(db: &SessionDb, request: &SessionRequest) -> Reply {
    debug!("returning {} session count", request.proto());
    let count = db.count(request.proto());
    Reply::success(Bytes::copy_from_slice(&count.to_be_bytes()), false)
}
