//! Declaration emitter for bundled `.d.ts` output.
//!
//! Prints a `BundledFile` as TypeScript declaration text:
//!
//! ```typescript
//! import { Readable } from "stream";
//! interface Options {
//!     input: Readable;
//! }
//! declare function run(options: Options): void;
//! export { Options, run };
//! ```
//!
//! and optionally a source map with one mapping per declaration that came
//! from a module of the bundle.

// Line/column tracking output buffer with source-map recording
pub mod source_writer;
pub use source_writer::SourceWriter;

// Statement, member and type printing
pub mod printer;
pub use printer::{DeclarationPrinter, PrintResult, print};
