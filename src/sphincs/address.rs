//! SPHINCS+ hash-function address (`ADRS`): eight big-endian 32-bit words binding every hash
//! call to the place it occurs in the hypertree / FORS forest / WOTS+ chain (Section 4.9-4.11).
//! The meaning of the last three words depends on `ty`, same as the reference construction.

pub(crate) const ADDR_BYTES: usize = 32;

pub(crate) const WOTS_HASH: u32 = 0;
pub(crate) const WOTS_PK: u32 = 1;
pub(crate) const TREE: u32 = 2;
pub(crate) const FORS_TREE: u32 = 3;
pub(crate) const FORS_ROOTS: u32 = 4;
pub(crate) const WOTS_PRF: u32 = 5;
pub(crate) const FORS_PRF: u32 = 6;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Address([u32; 8]);

impl Address {
    pub(crate) fn new() -> Self {
        Address([0; 8])
    }

    pub(crate) fn set_layer(&mut self, layer: u32) {
        self.0[0] = layer;
    }

    pub(crate) fn set_tree(&mut self, tree: u64) {
        self.0[1] = (tree >> 32) as u32;
        self.0[2] = tree as u32;
    }

    pub(crate) fn set_type(&mut self, ty: u32) {
        self.0[3] = ty;
        self.0[4] = 0;
        self.0[5] = 0;
        self.0[6] = 0;
    }

    pub(crate) fn set_key_pair(&mut self, idx: u32) {
        self.0[4] = idx;
    }

    /// WOTS+ chain index, or (reused for FORS) which of the `k` trees this address selects.
    pub(crate) fn set_chain(&mut self, idx: u32) {
        self.0[5] = idx;
    }

    /// WOTS+ hash-step index, or (reused for FORS) the leaf index within the selected tree.
    pub(crate) fn set_hash(&mut self, idx: u32) {
        self.0[6] = idx;
    }

    pub(crate) fn set_tree_height(&mut self, h: u32) {
        self.0[5] = h;
    }

    pub(crate) fn set_tree_index(&mut self, idx: u32) {
        self.0[6] = idx;
    }

    pub(crate) fn to_bytes(self) -> [u8; ADDR_BYTES] {
        let mut out = [0u8; ADDR_BYTES];
        for (i, word) in self.0.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}
