//! Session: owner of the transport and the dispatcher.
//!
//! One [`Session`] wraps one initialised transport. Every call goes through
//! [`Session::dispatch`], which holds the session lock from encode to decode. The lock is
//! reentrant so the open and connect sequences can hold it across several dispatches.

use crate::config::{LoggingLevel, SessionConfig};
use crate::connection::{ConnectTarget, Connection};
use crate::envelope::{decode_string, Arg, Envelope, RawVariant, Reply};
use crate::error::{Error, Result};
use crate::message::{self, Message};
use crate::transport::{CommsHandle, Transport};
use crate::variant::Variant;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace};

const VERSION_BUFFER_LEN: usize = 256;

pub struct Session<T: Transport> {
    config: SessionConfig,
    transport: ReentrantMutex<T>,
    active: AtomicBool,
}

impl<T: Transport> Session<T> {
    /// Initialise `transport`, apply the configured logging level and log the library version.
    ///
    /// The transport is released again if any step after initialisation fails.
    pub fn open(transport: T, config: SessionConfig) -> Result<Self> {
        let session = Session {
            config,
            transport: ReentrantMutex::new(transport),
            active: AtomicBool::new(false),
        };
        {
            let transport = session.lock();
            let log_path = session.config.log_path();
            let license_path = session.config.license_path();
            if !transport.initialise(&log_path, &license_path)? {
                return Err(Error::Protocol { message: "INITIALISE" });
            }
            session.active.store(true, Ordering::Release);
            info!(log = %log_path.display(), license = %license_path.display(), "Linkam library initialised");

            session.set_logging_level(session.config.logging_level)?;
            let version = session.version()?;
            info!(%version, "Linkam library version");
        }
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Take the session lock. Reentrant on the calling thread.
    pub(crate) fn lock(&self) -> ReentrantMutexGuard<'_, T> {
        self.transport.lock()
    }

    /// Issue `message` on `handle` with up to three arguments.
    ///
    /// `Ok(false)` from the transport becomes [`Error::Protocol`]; a transport that cannot be
    /// reached becomes [`Error::Transport`]. The reply is decoded per the message catalog and
    /// otherwise passed through untouched.
    pub fn dispatch<'a, I>(&self, message: Message, handle: CommsHandle, args: I) -> Result<Reply>
    where
        I: IntoIterator<Item = Arg<'a>>,
    {
        let descriptor = message::descriptor(message)
            .ok_or_else(|| Error::CatalogFault(format!("message {} has no catalog entry", message)))?;

        let transport = self.lock();
        if !self.is_active() {
            return Err(Error::NotConnected);
        }
        let mut envelope = Envelope::encode(args)?;
        let mut result = RawVariant::zeroed();
        trace!(msg = descriptor.name(), opcode = descriptor.opcode, %handle, "dispatch");
        if !transport.process_message(descriptor.opcode, handle, &mut result, &mut envelope.slots)? {
            debug!(msg = descriptor.name(), %handle, "call failed");
            return Err(Error::Protocol { message: descriptor.name() });
        }
        Ok(Reply::decode(result, descriptor.result_tag)?)
    }

    /// Read a string of at most `len` bytes.
    ///
    /// Unlike a parameter set, a boolean `false` reply here is an error.
    pub fn read_string(&self, message: Message, len: u32, handle: CommsHandle) -> Result<String> {
        let mut buf = vec![0u8; len as usize + 1];
        let reply = self.dispatch(
            message,
            handle,
            [Arg::Ptr(buf.as_mut_slice()), Arg::Value(Variant::Uint32(len))],
        )?;
        if reply.as_bool() == Some(false) {
            debug!(msg = message.name(), "string read refused");
            return Err(Error::Protocol { message: message.name() });
        }
        Ok(decode_string(&buf))
    }

    pub fn version(&self) -> Result<String> {
        let transport = self.lock();
        if !self.is_active() {
            return Err(Error::NotConnected);
        }
        let mut buf = [0u8; VERSION_BUFFER_LEN];
        if !transport.version(&mut buf)? {
            return Err(Error::Protocol { message: "GET_VERSION" });
        }
        Ok(decode_string(&buf))
    }

    pub fn set_logging_level(&self, level: LoggingLevel) -> Result<()> {
        let reply = self.dispatch(
            Message::EnableLogging,
            CommsHandle::NONE,
            [Arg::Value(Variant::Uint32(level.code()))],
        )?;
        if reply.as_bool() == Some(false) {
            return Err(Error::Protocol { message: Message::EnableLogging.name() });
        }
        debug!(?level, "logging level set");
        Ok(())
    }

    /// Release the transport. Safe to call more than once.
    pub fn close(&self) {
        let transport = self.lock();
        if self.active.swap(false, Ordering::AcqRel) {
            transport.exit();
            info!("Linkam library released");
        }
    }

    pub fn connect(&self, target: ConnectTarget) -> Result<Connection<'_, T>> {
        let mut connection = Connection::new(self, target);
        connection.open()?;
        Ok(connection)
    }

    /// Connect over USB, optionally to the controller with the given serial number.
    pub fn connect_usb(&self, serial_number: Option<&str>) -> Result<Connection<'_, T>> {
        self.connect(ConnectTarget::Usb {
            serial_number: serial_number.map(str::to_string),
        })
    }

    pub fn connect_serial(&self, port: &str) -> Result<Connection<'_, T>> {
        self.connect(ConnectTarget::Serial { port: port.to_string() })
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("active", &self.is_active())
            .finish()
    }
}
