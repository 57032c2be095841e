use serde::{Deserialize, Serialize};

// Percentages are derived from their counters, never summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScoreStats {
    pub fgm: u32,
    pub fga: u32,
    pub fg_pct: f64,
    pub fg3m: u32,
    pub fg3a: u32,
    pub fg3_pct: f64,
    pub ftm: u32,
    pub fta: u32,
    pub ft_pct: f64,
    pub oreb: u32,
    pub dreb: u32,
    pub reb: u32,
    pub ast: u32,
    pub tov: u32,
    pub stl: u32,
    pub blk: u32,
    pub blka: u32,
    pub pf: u32,
    pub pfd: u32,
    pub pts: u32,
    pub plus_minus: i32,
}

impl BoxScoreStats {
    pub fn recompute_rates(&mut self) {
        self.fg_pct = rate(self.fgm, self.fga);
        self.fg3_pct = rate(self.fg3m, self.fg3a);
        self.ft_pct = rate(self.ftm, self.fta);
    }

    pub fn absorb(&mut self, other: &BoxScoreStats) {
        self.fgm += other.fgm;
        self.fga += other.fga;
        self.fg3m += other.fg3m;
        self.fg3a += other.fg3a;
        self.ftm += other.ftm;
        self.fta += other.fta;
        self.oreb += other.oreb;
        self.dreb += other.dreb;
        self.reb += other.reb;
        self.ast += other.ast;
        self.tov += other.tov;
        self.stl += other.stl;
        self.blk += other.blk;
        self.blka += other.blka;
        self.pf += other.pf;
        self.pfd += other.pfd;
        self.pts += other.pts;
        self.plus_minus += other.plus_minus;
        self.recompute_rates();
    }

    pub fn oreb_rate(&self) -> f64 {
        rate(self.oreb, self.oreb + self.dreb)
    }

    pub fn possessions_used(&self) -> f64 {
        let missed = f64::from(self.fga.saturating_sub(self.fgm));
        f64::from(self.fga) + 0.4 * f64::from(self.fta) - 1.07 * self.oreb_rate() * missed
            + f64::from(self.tov)
    }
}

pub fn recompute_plus_minus(a: &mut BoxScoreStats, b: &mut BoxScoreStats) {
    let diff = i64::from(a.pts) - i64::from(b.pts);
    a.plus_minus = diff as i32;
    b.plus_minus = -(diff as i32);
}

fn rate(makes: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        f64::from(makes) / f64::from(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_attempts_give_zero_rates() {
        let mut stats = BoxScoreStats::default();
        stats.recompute_rates();
        assert_eq!(stats.fg_pct, 0.0);
        assert_eq!(stats.fg3_pct, 0.0);
        assert_eq!(stats.ft_pct, 0.0);
        assert_eq!(stats.oreb_rate(), 0.0);
    }

    #[test]
    fn absorb_rederives_rates_instead_of_summing() {
        let mut a = BoxScoreStats {
            fgm: 1,
            fga: 1,
            ..Default::default()
        };
        a.recompute_rates();
        let mut b = BoxScoreStats {
            fgm: 0,
            fga: 3,
            ..Default::default()
        };
        b.recompute_rates();
        a.absorb(&b);
        assert_eq!(a.fga, 4);
        assert_eq!(a.fg_pct, 0.25);
    }

    #[test]
    fn possessions_used_applies_offensive_rebound_credit() {
        let stats = BoxScoreStats {
            fga: 10,
            fgm: 4,
            fta: 5,
            oreb: 1,
            dreb: 3,
            tov: 2,
            ..Default::default()
        };
        let expected = 10.0 + 2.0 - 1.07 * 0.25 * 6.0 + 2.0;
        assert!((stats.possessions_used() - expected).abs() < 1e-9);
    }

    #[test]
    fn plus_minus_is_symmetric() {
        let mut a = BoxScoreStats {
            pts: 7,
            ..Default::default()
        };
        let mut b = BoxScoreStats {
            pts: 10,
            ..Default::default()
        };
        recompute_plus_minus(&mut a, &mut b);
        assert_eq!(a.plus_minus, -3);
        assert_eq!(b.plus_minus, 3);
    }
}
