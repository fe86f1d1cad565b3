pub mod device_values;
pub mod heater_status;

#[cfg(test)]
mod test {
    use super::device_values::DeviceValues;
    use super::heater_status::HeaterStatus;
    use std::fs;
    use std::path::PathBuf;

    fn read_resource(filename: &str) -> String {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push(format!("resources/test/{}", filename));
        fs::read_to_string(d.as_path()).unwrap()
    }

    #[test]
    fn device_values_heating() {
        let input = read_resource("device_values.json");
        let output: DeviceValues = serde_json::from_str(&input).unwrap();
        assert_eq!(19.5, output.current_room_temp);
        assert_eq!(21.0, output.current_set_point);
        assert_eq!(HeaterStatus::On, output.heat_on_off_status);
    }

    #[test]
    fn device_values_not_heating() {
        let input = read_resource("device_values_off.json");
        let output: DeviceValues = serde_json::from_str(&input).unwrap();
        assert_eq!(22.5, output.current_room_temp);
        assert_eq!(18.0, output.current_set_point);
        assert!(!output.heat_on_off_status.is_on());
    }

    #[test]
    fn unknown_heater_status_is_off() {
        let input = read_resource("device_values_unknown_status.json");
        let output: DeviceValues = serde_json::from_str(&input).unwrap();
        assert_eq!(HeaterStatus::Off, output.heat_on_off_status);

        for raw in &[
            r#""""#,
            r#""on""#,
            r#""-1""#,
            r#""01""#,
            r#"" 1""#,
            r#""+1""#,
            r#""1.0""#,
            "1",
            "null",
            "true",
        ] {
            let status: HeaterStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(HeaterStatus::Off, status, "input {}", raw);
        }
    }

    #[test]
    fn only_exact_one_is_on() {
        let status: HeaterStatus = serde_json::from_str(r#""1""#).unwrap();
        assert!(status.is_on());
    }

    #[test]
    #[should_panic]
    fn device_values_unquoted_number() {
        let input = read_resource("device_values_unquoted.json");
        let _output: DeviceValues = serde_json::from_str(&input).unwrap();
    }

    #[test]
    #[should_panic]
    fn device_values_invalid_token_response() {
        let input = read_resource("device_values_invalid_token.json");
        let _output: DeviceValues = serde_json::from_str(&input).unwrap();
    }

    #[test]
    #[should_panic]
    fn device_values_html() {
        let input = read_resource("invalid_json.html");
        let _output: DeviceValues = serde_json::from_str(&input).unwrap();
    }
}
