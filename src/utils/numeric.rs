/// 保留两位小数（仅用于展示，存储值保持原精度）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(80.833_333), 80.83);
        assert_eq!(round2(3.456), 3.46);
        assert_eq!(round2(0.0), 0.0);
    }
}
