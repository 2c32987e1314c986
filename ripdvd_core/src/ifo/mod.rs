/*!
# Rip DVD: IFO Decoding

The IFO files on a DVD-Video disc are small — under a megabyte — so the
decoders here all work against complete in-memory images: [`reader`] holds
the big-endian/BCD primitives, [`vmg`] handles the global `VIDEO_TS.IFO`
title index, and [`vts`] handles the per-title-set `VTS_nn_0.IFO` files,
including the PGC/C_ADT cell join.
*/

pub(crate) mod reader;
pub(crate) mod vmg;
pub(crate) mod vts;
