use crate::config::{ClientOptions, ServerOptions};
use crate::connection::{ConnectionState, Role, StateCell, WSConnection};
use crate::error::Error;
use crate::event::{Event, EventStream};
use crate::keepalive::KeepAlive;
use crate::read::ReadStream;
use crate::request::{build_upgrade_request, RequestExt};
use crate::split::WSWriter;
use crate::utils::{generate_websocket_accept_value, generate_websocket_key};
use crate::write::WriteStream;
use bytes::BytesMut;
use log::{debug, warn};
use std::time::Duration;
use tokio::io::{split, AsyncReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;
use tokio::time::timeout;

pub(crate) const SEC_WEBSOCKET_KEY: &str = "Sec-WebSocket-Key";
const SEC_WEBSOCKET_ACCEPT: &str = "Sec-WebSocket-Accept";

pub(crate) const HTTP_ACCEPT_RESPONSE: &str = "HTTP/1.1 101 Switching Protocols\r\n\
        Connection: Upgrade\r\n\
        Upgrade: websocket\r\n\
        Sec-WebSocket-Accept: {}\r\n\
        \r\n";

// Limit the maximum amount of header data read, and bound the whole exchange
// with a timeout so a silent peer can't park the handshake forever.
const MAX_HEADER_SIZE: usize = 1024 * 16;
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connects to `host` on the default port (80) with default options.
pub async fn connect_async(host: &str) -> Result<WSConnection, Error> {
    connect_async_with_options(host, ClientOptions::default()).await
}

/// Client side of the opening handshake: sends the HTTP upgrade request and
/// waits for a response carrying the accept token derived from the key this
/// connection actually sent. On success the connection is `Open`, the
/// keepalive timer is running, and `Handshake` then `Open` are already queued
/// on the event stream.
pub async fn connect_async_with_options(
    host: &str,
    mut options: ClientOptions,
) -> Result<WSConnection, Error> {
    let stream = TcpStream::connect((host, options.port)).await?;
    let state = StateCell::new();
    state.transition(ConnectionState::HandshakeInProgress);

    let (read_half, mut write_half) = split(stream);
    let mut buf_reader = BufReader::new(read_half);

    let key = options.key.take().unwrap_or_else(generate_websocket_key);
    let request = build_upgrade_request(host, &key, &options);
    write_half.write_all(request.as_bytes()).await?;

    let expected_accept = generate_websocket_accept_value(&key);
    let leftover = await_accept(&mut buf_reader, &expected_accept).await?;
    debug!("client handshake with {} completed", host);

    Ok(spawn_connection(
        buf_reader,
        write_half,
        leftover,
        options.keep_alive,
        state,
        Role::Client,
    ))
}

/// Accepts an inbound upgrade on an already-established TCP stream, using
/// default options.
pub async fn accept_async(stream: TcpStream) -> Result<WSConnection, Error> {
    accept_async_with_options(stream, ServerOptions::default()).await
}

/// Server side of the opening handshake: parses the upgrade request, computes
/// the accept token from the peer's `Sec-WebSocket-Key` and answers
/// `101 Switching Protocols`. The returned connection is already `Open`.
pub async fn accept_async_with_options(
    stream: TcpStream,
    options: ServerOptions,
) -> Result<WSConnection, Error> {
    let state = StateCell::new();
    state.transition(ConnectionState::HandshakeInProgress);

    let (read_half, mut write_half) = split(stream);
    let mut buf_reader = BufReader::new(read_half);

    let (request_bytes, leftover) = read_header_block(&mut buf_reader).await?;

    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut request = httparse::Request::new(&mut headers);
    if request.parse(&request_bytes)?.is_partial() {
        return Err(Error::IncompleteHandshake);
    }

    let key = request
        .get_header_value(SEC_WEBSOCKET_KEY)
        .ok_or(Error::NoSecWebsocketKey)?;
    let accept_value = generate_websocket_accept_value(&key);

    let response = HTTP_ACCEPT_RESPONSE.replace("{}", &accept_value);
    write_half.write_all(response.as_bytes()).await?;
    debug!("server handshake completed");

    Ok(spawn_connection(
        buf_reader,
        write_half,
        leftover,
        options.keep_alive,
        state,
        Role::Server,
    ))
}

/// Wires the open socket into the connection: channels, keepalive, read and
/// write tasks. The initial events are queued before the read task spawns so
/// the application always observes `Handshake`/`Open` first.
fn spawn_connection(
    reader: BufReader<ReadHalf<TcpStream>>,
    write_half: WriteHalf<TcpStream>,
    leftover: BytesMut,
    keep_alive: Duration,
    state: StateCell,
    role: Role,
) -> WSConnection {
    let (event_tx, event_rx) = unbounded_channel();
    let (frame_tx, frame_rx) = unbounded_channel();
    let (close_tx, close_rx) = unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    state.transition(ConnectionState::Open);
    if role == Role::Client {
        let _ = event_tx.send(Event::Handshake);
    }
    let _ = event_tx.send(Event::Open);

    let keep_alive_handle = KeepAlive::new(keep_alive).start(frame_tx.clone());

    let mut read_stream = ReadStream::new(
        reader,
        leftover,
        event_tx.clone(),
        frame_tx.clone(),
        close_rx,
        shutdown_tx,
        keep_alive_handle,
        state.clone(),
    );
    let mut write_stream = WriteStream::new(write_half, frame_rx, shutdown_rx);

    // The read task owns the shutdown of the whole connection: whatever way
    // it exits, it cancels the keepalive, flips the shutdown watch for the
    // write task and emits the final Close event.
    tokio::spawn(async move {
        read_stream.poll_events().await;
    });

    tokio::spawn(async move {
        if let Err(err) = write_stream.run().await {
            warn!("write stream terminated: {}", err);
        }
    });

    WSConnection::new(
        WSWriter::new(frame_tx, close_tx, state.clone()),
        EventStream::new(event_rx),
        state,
        role,
    )
}

/// Client-side response read: accumulates until the blank line, then checks
/// the accept token against the one computed from our key. Returns whatever
/// bytes arrived past the header terminator.
async fn await_accept<T: AsyncReadExt + Unpin>(
    buf_reader: &mut T,
    expected_accept: &str,
) -> Result<BytesMut, Error> {
    let (header_bytes, leftover) = read_header_block(buf_reader).await?;
    let headers = String::from_utf8_lossy(&header_bytes);

    match header_value(&headers, SEC_WEBSOCKET_ACCEPT) {
        Some(accept) if accept == expected_accept => Ok(leftover),
        _ => Err(Error::InvalidAcceptKey),
    }
}

/// Reads from the socket until an HTTP header block is complete, returning
/// the block (terminator included) and any bytes read past it.
async fn read_header_block<T: AsyncReadExt + Unpin>(
    buf_reader: &mut T,
) -> Result<(BytesMut, BytesMut), Error> {
    let mut header_buf = BytesMut::with_capacity(1024);

    loop {
        if let Some(end) = find_header_end(&header_buf) {
            let leftover = header_buf.split_off(end + 4);
            return Ok((header_buf, leftover));
        }
        if header_buf.len() > MAX_HEADER_SIZE {
            return Err(Error::IncompleteHandshake);
        }

        let n = timeout(HANDSHAKE_TIMEOUT, buf_reader.read_buf(&mut header_buf)).await??;
        if n == 0 {
            return Err(Error::SocketClosedUnexpectedly);
        }
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

fn header_value(headers: &str, name: &str) -> Option<String> {
    headers.lines().find_map(|line| {
        let (header_name, value) = line.split_once(':')?;
        header_name
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}
