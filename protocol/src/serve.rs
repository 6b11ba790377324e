use cipherlands_core::{
    ConfidentialBackend, DisclosureOutcome, JoinOutcome, SeedSource, TileEngine, TileError,
};

use crate::*;

/// Applies one request to `engine` and classifies the result.
pub fn serve<B, S>(engine: &mut TileEngine<B, S>, envelope: Envelope) -> Response
where
    B: ConfidentialBackend,
    S: SeedSource,
{
    let Envelope { caller, request } = envelope;
    match dispatch(engine, caller, request) {
        Ok(response) => response,
        Err(err) => {
            log::warn!("Request from {caller} rejected: {err}");
            err.into()
        }
    }
}

fn dispatch<B, S>(
    engine: &mut TileEngine<B, S>,
    caller: cipherlands_core::Identity,
    request: Request,
) -> Result<Response, TileError>
where
    B: ConfidentialBackend,
    S: SeedSource,
{
    let ok = |reply| Response::Ok { reply };

    Ok(match request {
        Request::Join => match engine.join(caller)? {
            JoinOutcome::Assigned(record) => ok(Reply::Handle {
                handle: record.handle(),
            }),
            JoinOutcome::AlreadyJoined(record) => Response::NoOp {
                reply: Reply::Handle {
                    handle: record.handle(),
                },
            },
        },
        Request::MakePublic => match engine.make_public(caller)? {
            DisclosureOutcome::Disclosed(entry) => ok(Reply::Handle {
                handle: entry.handle,
            }),
            DisclosureOutcome::AlreadyPublic(entry) => Response::NoOp {
                reply: Reply::Handle {
                    handle: entry.handle,
                },
            },
        },
        Request::GetOwnConfidentialHandle { identity } => ok(Reply::Handle {
            handle: engine.get_own_confidential_handle(&identity)?,
        }),
        Request::DecryptOwn { handle } => ok(Reply::Cell {
            cell: engine.decrypt_as(caller, handle)?.get(),
        }),
        Request::IsOccupied { cell } => {
            let cell = engine.grid().cell(cell)?;
            ok(Reply::Occupied {
                occupied: engine.is_occupied(cell)?,
            })
        }
        Request::ListPublic => ok(Reply::Roster {
            entries: engine.list_public(),
        }),
        Request::DecryptPublic { handle } => ok(Reply::Cell {
            cell: engine.decrypt_public(handle)?.get(),
        }),
        Request::HasJoined { identity } => ok(Reply::Flag {
            value: engine.has_joined(&identity),
        }),
        Request::IsPublic { identity } => ok(Reply::Flag {
            value: engine.is_public(&identity),
        }),
        Request::Status => ok(Reply::Status {
            status: engine.status(),
        }),
    })
}

pub fn decode_envelope(json: &str) -> Result<Envelope> {
    serde_json::from_str(json).map_err(ProtocolError::Malformed)
}

pub fn encode_response(response: &Response) -> Result<String> {
    serde_json::to_string(response).map_err(ProtocolError::Encode)
}

/// JSON in, JSON out. Malformed input is an error, engine failures are not.
pub fn serve_json<B, S>(engine: &mut TileEngine<B, S>, json: &str) -> Result<String>
where
    B: ConfidentialBackend,
    S: SeedSource,
{
    let envelope = decode_envelope(json)?;
    encode_response(&serve(engine, envelope))
}
