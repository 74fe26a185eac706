//! RC4 keystream.

use anyhow::{Result, bail, ensure};
use cipher::consts::{U5, U16, U32};
use cipher::{KeyInit, StreamCipher};
use rc4::Rc4;

use crate::cipher::Mode;

/// XORs `data` with the RC4 keystream. Encryption and decryption coincide.
pub fn apply_rc4(key: &[u8], mode: Mode, data: &[u8]) -> Result<Vec<u8>> {
    ensure!(mode == Mode::Stream, "RC4 only runs in its native stream mode");

    let mut buffer = data.to_vec();
    match key.len() {
        5 => Rc4::<U5>::new_from_slice(key).map(|mut rc4| rc4.apply_keystream(&mut buffer)),
        16 => Rc4::<U16>::new_from_slice(key).map(|mut rc4| rc4.apply_keystream(&mut buffer)),
        32 => Rc4::<U32>::new_from_slice(key).map(|mut rc4| rc4.apply_keystream(&mut buffer)),
        n => bail!("invalid RC4 key length: {n}"),
    }
    .map_err(|_| anyhow::anyhow!("invalid RC4 key"))?;

    Ok(buffer)
}
