/// Test fixtures: representative JSON payloads from the GIOS pjp-api.
///
/// Trimmed to the fields the parser reads, but shaped like the real
/// responses from https://api.gios.gov.pl/pjp-api/rest/ :
///
///   station/findAll        → [{ id, stationName, gegrLat, gegrLon, city: { name, … }, … }]
///   station/sensors/{id}   → [{ id, stationId, param: { paramName, paramFormula, … } }]
///   data/getData/{id}      → { key, values: [{ date, value }] }
///
/// Note: depending on API version, ids and coordinates come back as JSON
/// numbers or as strings, and `value` is `null` for hours the station did
/// not report. Parsers must handle both.

/// Three stations: string-typed fields, number-typed fields, and one with
/// `city: null`.
#[cfg(test)]
pub(crate) fn fixture_stations_json() -> &'static str {
    r#"[
      {
        "id": "114",
        "stationName": "Wrocław - Bartnicza",
        "gegrLat": "51.115933",
        "gegrLon": "17.141125",
        "city": {
          "id": 1064,
          "name": "Wrocław",
          "commune": { "communeName": "Wrocław", "districtName": "Wrocław", "provinceName": "DOLNOŚLĄSKIE" }
        },
        "addressStreet": "ul. Bartnicza"
      },
      {
        "id": 400,
        "stationName": "Kraków, Aleja Krasińskiego",
        "gegrLat": 50.057678,
        "gegrLon": 19.926189,
        "city": { "id": 415, "name": "Kraków" },
        "addressStreet": "al. Krasińskiego"
      },
      {
        "id": 9001,
        "stationName": "Stacja bez miasta",
        "gegrLat": "50.0",
        "gegrLon": "20.0",
        "city": null
      }
    ]"#
}

/// Two sensors at station 114.
#[cfg(test)]
pub(crate) fn fixture_sensors_json() -> &'static str {
    r#"[
      {
        "id": 642,
        "stationId": 114,
        "param": { "paramName": "dwutlenek azotu", "paramFormula": "NO2", "paramCode": "NO2", "idParam": 6 }
      },
      {
        "id": "644",
        "stationId": "114",
        "param": { "paramName": "pył zawieszony PM10", "paramFormula": "PM10", "paramCode": "PM10", "idParam": 3 }
      }
    ]"#
}

/// Newest first. The first entry carries a historical companion, the third
/// has its value as a string.
#[cfg(test)]
pub(crate) fn fixture_series_json() -> &'static str {
    r#"{
      "key": "NO2",
      "values": [
        { "date": "2024-06-01 14:00:00", "value": 21.3,
          "historical_value": 18.0, "historical_value_date": "2024-05-01 14:00:00" },
        { "date": "2024-06-01 13:00:00", "value": 19.8 },
        { "date": "2024-06-01 12:00:00", "value": "17.25" }
      ]
    }"#
}

/// One null-valued hour followed by a real reading.
#[cfg(test)]
pub(crate) fn fixture_series_with_nulls_json() -> &'static str {
    r#"{
      "key": "PM10",
      "values": [
        { "date": "2024-06-01 13:00:00", "value": null },
        { "date": "2024-06-01 12:00:00", "value": 5 }
      ]
    }"#
}
