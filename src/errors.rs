use derive_more::{Display, Error};

/// Why a plan request did not produce the plans that were asked for.
///
/// Never shown to the shopper: every variant is recovered by falling back to the
/// default plans (or to single payment) and is only logged.
#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum PlanFetchError {
    #[display("fetch failure: {_0}")]
    FetchFailure(#[error(not(source))] String),
    #[display("malformed response: {_0}")]
    MalformedResponse(#[error(not(source))] String),
    #[display("no plans defined")]
    NoPlans,
}

#[derive(Debug, Display, Error, PartialEq)]
pub enum BinTableError {
    #[display("bank code must not be empty")]
    EmptyBankCode,
    #[display("bin {bin:?} listed under {bank} is not a 6-digit prefix")]
    InvalidBin { bank: String, bin: String },
}
