/// Data layer: snapshot loading, aggregation and normalization.
///
/// Architecture:
/// ```text
///  Results/<prefix>_<DD-MM-YYYY>.json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  file name → date, body → counts  → Vec<Snapshot>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  union of versions → AggregateTable [version][snapshot]
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  per-version / global / raw → NormalizedTable
///   └───────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod normalize;
