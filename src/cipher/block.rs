//! Block cipher modes of operation.
//!
//! Every function here is generic over a RustCrypto block cipher, so one
//! implementation serves AES, Camellia, Twofish, CAST6, DES, 3DES, Blowfish,
//! CAST5 and IDEA alike. The 128-bit variants additionally support CTR and
//! the authenticated GCM and CCM modes, which are only defined for 16-byte
//! blocks.
//!
//! Modes without padding (CFB, OFB, CTR) accept inputs of any length. ECB and
//! CBC require whole blocks and fail on malformed padding; those failures are
//! what trial decryption relies on to reject a key.

use aes_gcm::AesGcm;
use aes_gcm::aead::Aead;
use aes_gcm::aead::generic_array::GenericArray;
use anyhow::{Result, anyhow, bail, ensure};
use ccm::Ccm;
use cipher::block_padding::{Iso10126, NoPadding, Pkcs7};
use cipher::consts::{U12, U16};
use cipher::typenum::{IsLess, Le, NonZero, U256};
use cipher::{BlockCipher, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit, StreamCipher};

use crate::cipher::{Mode, Padding};

/// Decrypts `data` with a 128-bit block cipher in any supported mode.
pub fn decrypt_wide<C>(key: &[u8], mode: Mode, padding: Padding, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher<BlockSize = U16> + BlockEncrypt + BlockDecrypt + KeyInit,
{
    match mode {
        Mode::Ctr => {
            let mut buffer = data.to_vec();
            ctr::Ctr128BE::<C>::new_from_slices(key, iv).map_err(|_| anyhow!("invalid key or iv length"))?.apply_keystream(&mut buffer);
            Ok(buffer)
        }
        Mode::Gcm => {
            ensure!(iv.len() == 12, "gcm nonce must be 12 bytes");
            let cipher = AesGcm::<C, U12>::new_from_slice(key).map_err(|_| anyhow!("invalid key length"))?;
            cipher.decrypt(GenericArray::from_slice(iv), data).map_err(|_| anyhow!("gcm authentication failed"))
        }
        Mode::Ccm => {
            ensure!(iv.len() == 12, "ccm nonce must be 12 bytes");
            let cipher = Ccm::<C, U16, U12>::new_from_slice(key).map_err(|_| anyhow!("invalid key length"))?;
            cipher.decrypt(GenericArray::from_slice(iv), data).map_err(|_| anyhow!("ccm authentication failed"))
        }
        _ => decrypt_narrow::<C>(key, mode, padding, iv, data),
    }
}

/// Encrypts `data` with a 128-bit block cipher in any supported mode.
pub fn encrypt_wide<C>(key: &[u8], mode: Mode, padding: Padding, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher<BlockSize = U16> + BlockEncrypt + BlockDecrypt + KeyInit,
{
    match mode {
        // CTR is symmetric.
        Mode::Ctr => decrypt_wide::<C>(key, mode, padding, iv, data),
        Mode::Gcm => {
            ensure!(iv.len() == 12, "gcm nonce must be 12 bytes");
            let cipher = AesGcm::<C, U12>::new_from_slice(key).map_err(|_| anyhow!("invalid key length"))?;
            cipher.encrypt(GenericArray::from_slice(iv), data).map_err(|e| anyhow!("gcm encryption failed: {e}"))
        }
        Mode::Ccm => {
            ensure!(iv.len() == 12, "ccm nonce must be 12 bytes");
            let cipher = Ccm::<C, U16, U12>::new_from_slice(key).map_err(|_| anyhow!("invalid key length"))?;
            cipher.encrypt(GenericArray::from_slice(iv), data).map_err(|e| anyhow!("ccm encryption failed: {e}"))
        }
        _ => encrypt_narrow::<C>(key, mode, padding, iv, data),
    }
}

/// Decrypts `data` in ECB, CBC, CFB or OFB mode.
pub fn decrypt_narrow<C>(key: &[u8], mode: Mode, padding: Padding, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt + KeyInit,
    C::BlockSize: IsLess<U256>,
    Le<C::BlockSize, U256>: NonZero,
{
    let mut buffer = data.to_vec();

    match mode {
        Mode::Ecb => {
            let decryptor = ecb::Decryptor::<C>::new_from_slice(key).map_err(|_| anyhow!("invalid key length"))?;
            let len = unpad(decryptor, padding, &mut buffer)?;
            buffer.truncate(len);
        }
        Mode::Cbc => {
            let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| anyhow!("invalid key or iv length"))?;
            let len = unpad(decryptor, padding, &mut buffer)?;
            buffer.truncate(len);
        }
        Mode::Cfb => {
            ensure!(padding == Padding::None, "cfb does not use padding");
            cfb_mode::BufDecryptor::<C>::new_from_slices(key, iv).map_err(|_| anyhow!("invalid key or iv length"))?.decrypt(&mut buffer);
        }
        Mode::Ofb => {
            ensure!(padding == Padding::None, "ofb does not use padding");
            ofb::Ofb::<C>::new_from_slices(key, iv).map_err(|_| anyhow!("invalid key or iv length"))?.apply_keystream(&mut buffer);
        }
        other => bail!("{other} mode is not available for this cipher"),
    }

    Ok(buffer)
}

/// Encrypts `data` in ECB, CBC, CFB or OFB mode.
pub fn encrypt_narrow<C>(key: &[u8], mode: Mode, padding: Padding, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt + KeyInit,
    C::BlockSize: IsLess<U256>,
    Le<C::BlockSize, U256>: NonZero,
{
    match mode {
        Mode::Ecb => {
            let encryptor = ecb::Encryptor::<C>::new_from_slice(key).map_err(|_| anyhow!("invalid key length"))?;
            pad(encryptor, padding, data, C::block_size())
        }
        Mode::Cbc => {
            let encryptor = cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| anyhow!("invalid key or iv length"))?;
            pad(encryptor, padding, data, C::block_size())
        }
        Mode::Cfb => {
            ensure!(padding == Padding::None, "cfb does not use padding");
            let mut buffer = data.to_vec();
            cfb_mode::BufEncryptor::<C>::new_from_slices(key, iv).map_err(|_| anyhow!("invalid key or iv length"))?.encrypt(&mut buffer);
            Ok(buffer)
        }
        // OFB is symmetric.
        Mode::Ofb => decrypt_narrow::<C>(key, mode, padding, iv, data),
        other => bail!("{other} mode is not available for this cipher"),
    }
}

/// Decrypts whole blocks in place and strips the padding.
///
/// Returns the plaintext length at the front of `buffer`.
fn unpad<D: BlockDecryptMut>(decryptor: D, padding: Padding, buffer: &mut [u8]) -> Result<usize> {
    let plaintext = match padding {
        Padding::Pkcs5 => decryptor.decrypt_padded_mut::<Pkcs7>(buffer),
        Padding::Iso10126 => decryptor.decrypt_padded_mut::<Iso10126>(buffer),
        Padding::None => decryptor.decrypt_padded_mut::<NoPadding>(buffer),
        other => bail!("{other} is not a block padding"),
    }
    .map_err(|_| anyhow!("invalid padding or length"))?;

    Ok(plaintext.len())
}

/// Pads `data` and encrypts it block by block.
fn pad<E: BlockEncryptMut>(encryptor: E, padding: Padding, data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; data.len() + block_size];
    buffer[..data.len()].copy_from_slice(data);

    let len = match padding {
        Padding::Pkcs5 => encryptor.encrypt_padded_mut::<Pkcs7>(&mut buffer, data.len()).map(<[u8]>::len),
        Padding::Iso10126 => encryptor.encrypt_padded_mut::<Iso10126>(&mut buffer, data.len()).map(<[u8]>::len),
        Padding::None => encryptor.encrypt_padded_mut::<NoPadding>(&mut buffer, data.len()).map(<[u8]>::len),
        other => bail!("{other} is not a block padding"),
    }
    .map_err(|_| anyhow!("plaintext is not a whole number of blocks"))?;

    buffer.truncate(len);
    Ok(buffer)
}
