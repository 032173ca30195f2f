use crate::dates;
use crate::records::{IndexRecord, PeerRecord, SectorIndexRecord, SectorRecord, StockRecord};

/// The five normalized datasets produced by one load.
///
/// Rows keep the order of their source files. Use the `*_latest_first`
/// views when the most recent trading day must come first.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct AggregateDataset {
    pub stock: Vec<StockRecord>,
    /// First row of the sector mapping file, if it had any.
    pub sector_info: Option<SectorRecord>,
    pub peers: Vec<PeerRecord>,
    pub index: Vec<IndexRecord>,
    pub sector_index: Vec<SectorIndexRecord>,
}

/// Row counts per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DatasetSummary {
    pub stock: usize,
    pub sector: usize,
    pub peers: usize,
    pub index: usize,
    pub sector_index: usize,
}

impl AggregateDataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            stock: self.stock.len(),
            sector: usize::from(self.sector_info.is_some()),
            peers: self.peers.len(),
            index: self.index.len(),
            sector_index: self.sector_index.len(),
        }
    }

    pub fn stock_latest_first(&self) -> Vec<&StockRecord> {
        sorted_latest_first(&self.stock, |r| r.date.as_str())
    }

    pub fn peers_latest_first(&self) -> Vec<&PeerRecord> {
        sorted_latest_first(&self.peers, |r| r.date.as_str())
    }

    pub fn index_latest_first(&self) -> Vec<&IndexRecord> {
        sorted_latest_first(&self.index, |r| r.index_date.as_str())
    }

    pub fn sector_index_latest_first(&self) -> Vec<&SectorIndexRecord> {
        sorted_latest_first(&self.sector_index, |r| r.index.index_date.as_str())
    }

    /// Most recent stock row, by parsed trade date.
    pub fn latest_stock(&self) -> Option<&StockRecord> {
        self.stock_latest_first().into_iter().next()
    }
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stock: {}, sector: {}, peers: {}, index: {}, sector index: {}",
            self.stock, self.sector, self.peers, self.index, self.sector_index
        )
    }
}

fn sorted_latest_first<'a, T>(rows: &'a [T], date: impl Fn(&T) -> &str) -> Vec<&'a T> {
    let mut keyed: Vec<_> = rows
        .iter()
        .map(|r| (dates::parse_trade_date(date(r)), r))
        .collect();
    // stable: rows sharing a date keep source order
    keyed.sort_by(|a, b| dates::latest_first(a.0, b.0));
    keyed.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(date: &str, symbol: &str) -> PeerRecord {
        PeerRecord {
            date: date.to_string(),
            symbol: symbol.to_string(),
            open_price: 1.0,
            close_price: 1.0,
            total_traded_quantity: 1.0,
            delivery_pct: 50.0,
        }
    }

    #[test]
    fn test_peers_latest_first() {
        let dataset = AggregateDataset {
            peers: vec![
                peer("12-May-2025", "A"),
                peer("garbage", "B"),
                peer("14-May-2025", "C"),
                peer("13-May-2025", "D"),
                peer("14-May-2025", "E"),
            ],
            ..Default::default()
        };
        let order: Vec<_> = dataset
            .peers_latest_first()
            .iter()
            .map(|p| p.symbol.as_str())
            .collect();
        assert_eq!(order, vec!["C", "E", "D", "A", "B"]);
        // source order is untouched
        assert_eq!(dataset.peers[0].symbol, "A");
    }

    #[test]
    fn test_summary_counts() {
        let dataset = AggregateDataset {
            peers: vec![peer("14-May-2025", "A"), peer("13-May-2025", "B")],
            sector_info: Some(SectorRecord {
                company_name: "ICICI Bank Ltd.".to_string(),
                industry: "Banks".to_string(),
                symbol: "ICICIBANK".to_string(),
                series: "EQ".to_string(),
                isin_code: "INE090A01021".to_string(),
            }),
            ..Default::default()
        };
        let summary = dataset.summary();
        assert_eq!(summary.peers, 2);
        assert_eq!(summary.sector, 1);
        assert_eq!(summary.stock, 0);
        assert_eq!(
            summary.to_string(),
            "stock: 0, sector: 1, peers: 2, index: 0, sector index: 0"
        );
    }

    #[test]
    fn test_latest_stock_on_empty_dataset() {
        assert!(AggregateDataset::default().latest_stock().is_none());
    }
}
