//! Static lookup tables behind injectable interfaces
//!
//! The alternatives tiers and the symbol→sector map stand in for what a
//! real system would query from a holdings database. Both sit behind
//! traits so a richer data source can be substituted without touching
//! the client.

use crate::finance::types::RiskTolerance;

/// Candidate symbols to consider as alternatives, per risk tier
pub trait AlternativesTable: Send + Sync {
    fn candidates(&self, tolerance: RiskTolerance) -> Vec<String>;
}

/// Symbol → sector classification
pub trait SectorMap: Send + Sync {
    /// The sector a symbol belongs to, if known
    fn sector_of(&self, symbol: &str) -> Option<&'static str>;

    /// Sectors a balanced portfolio is expected to cover
    fn key_sectors(&self) -> Vec<&'static str>;
}

/// Built-in three-tier alternatives table
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAlternatives;

impl AlternativesTable for StaticAlternatives {
    fn candidates(&self, tolerance: RiskTolerance) -> Vec<String> {
        let symbols: &[&str] = match tolerance {
            RiskTolerance::Low => &["BND", "VTIP", "VGSH", "VMBS", "MUB"],
            RiskTolerance::Medium => &["VTI", "VOO", "VIG", "IJH", "VXUS"],
            RiskTolerance::High => &["VGT", "VB", "VWO", "ARKK", "QQQ"],
        };
        symbols.iter().map(|s| (*s).to_string()).collect()
    }
}

/// Built-in symbol→sector map over common broad ETFs
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSectorMap;

impl SectorMap for StaticSectorMap {
    fn sector_of(&self, symbol: &str) -> Option<&'static str> {
        match symbol {
            "VTI" | "VOO" => Some("US Stocks"),
            "VGT" => Some("Technology"),
            "VHT" => Some("Healthcare"),
            "VFH" => Some("Financials"),
            "VNQ" => Some("Real Estate"),
            "BND" => Some("US Bonds"),
            "VXUS" => Some("International Stocks"),
            "VWO" => Some("Emerging Markets"),
            "BNDX" => Some("International Bonds"),
            _ => None,
        }
    }

    fn key_sectors(&self) -> Vec<&'static str> {
        vec![
            "US Stocks",
            "International Stocks",
            "US Bonds",
            "Real Estate",
        ]
    }
}
