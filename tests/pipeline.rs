// End-to-end runs over four synthetic block groups around downtown Chicago,
// read from GeoJSON or from a TIGER-style shapefile.
//
//   G1 170310000001  square at (-87.700, 41.850)  one rail stop at its center
//   G2 170310000002  square at (-87.650, 41.850)  one rail stop + a bus stop on 3 routes
//   G3 170310000003  square at (-87.600, 41.850)  only an inactive and an unrouted bus stop
//   G4 170310000004  square at (-87.550, 41.850)  missing from race.csv, so dropped
//   G5 170310000005  no geometry, so dropped

use std::{fs, path::Path};

use acs_transit::{
    cli::RunArgs,
    commands::run,
    run_pipeline, PipelineConfig, KEY,
};
use polars::prelude::*;
use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    PolygonRing,
};

const G1: i64 = 170310000001;
const G2: i64 = 170310000002;
const G3: i64 = 170310000003;

/// The `.prj` shipped with Census TIGER/Line shapefiles.
const TIGER_PRJ: &str = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["Degree",0.017453292519943295]]"#;

/// Lower-left corners of the block-group squares G1..G4.
const CORNERS: [(i64, f64, f64); 4] = [
    (170310000001, -87.700, 41.850),
    (170310000002, -87.650, 41.850),
    (170310000003, -87.600, 41.850),
    (170310000004, -87.550, 41.850),
];

fn square(x: f64, y: f64) -> String {
    let s = 0.01;
    format!("[[[{x},{y}],[{},{y}],[{},{}],[{x},{}],[{x},{y}]]]", x + s, x + s, y + s, y + s)
}

fn write_inputs(root: &Path) {
    let acs = root.join("ACS");
    fs::create_dir_all(&acs).unwrap();

    fs::write(acs.join("population.csv"), concat!(
        "GEOID,Total_population,Under 5 years_population,15 to 17 years_population,62 to 64 years_population,65 and 66 years_population\n",
        "170310000001,1000,100,300,200,100\n",
        "170310000002,400,0,100,0,0\n",
        "170310000003,0,0,0,0,0\n",
        "170310000004,200,0,50,50,0\n",
        "170310000005,300,0,100,0,0\n",
    )).unwrap();

    fs::write(acs.join("income.csv"), concat!(
        "GEOID,Total_income,\"Less than $10,000_income\",\"$10,000 to $14,999_income\",\"$25,000 to $29,999_income\"\n",
        "170310000001,200,20,30,150\n",
        "170310000002,100,50,0,50\n",
        "170310000003,10,1,1,8\n",
        "170310000004,100,10,10,80\n",
        "170310000005,100,10,10,80\n",
    )).unwrap();

    fs::write(acs.join("race.csv"), concat!(
        "GEOID,Total_race,White alone_race,Black or African American alone_race\n",
        "170310000001,1000,500,250\n",
        "170310000002,400,100,200\n",
        "170310000003,0,0,0\n",
        "170310000005,300,150,150\n",
    )).unwrap();

    let commute_header = [
        "Less than 10 minutes_commute_time",
        "10 to 14 minutes_commute_time",
        "15 to 19 minutes_commute_time",
        "20 to 24 minutes_commute_time",
        "25 to 29 minutes_commute_time",
        "30 to 34 minutes_commute_time",
        "35 to 44 minutes_commute_time",
        "45 to 59 minutes_commute_time",
        "60 or more minutes_commute_time",
        "Car, truck, or van_commute_time",
        "Walked_commute_time",
        "Taxicab, motorcycle, bicycle, or other means_commute_time",
        "Public transportation (excluding taxicab)_commute_time",
    ].map(|name| format!("\"{name}\"")).join(",");
    fs::write(acs.join("commute_time.csv"), format!(concat!(
        "GEOID,Total_commute_time,{}\n",
        "170310000001,100,10,10,10,10,10,10,20,10,10,50,10,15,25\n",
        "170310000002,200,20,20,20,20,20,20,40,20,20,50,20,30,100\n",
        "170310000003,50,5,5,5,5,5,5,5,5,10,30,5,5,10\n",
        "170310000004,10,1,1,1,1,1,1,1,1,2,5,1,1,3\n",
        "170310000005,10,1,1,1,1,1,1,1,1,2,5,1,1,3\n",
    ), commute_header)).unwrap();

    fs::write(acs.join("employment.csv"), concat!(
        "GEOID,Total_employment\n",
        "170310000001,600\n",
        "170310000002,100\n",
        "170310000003,5\n",
        "170310000004,100\n",
        "170310000005,100\n",
    )).unwrap();

    fs::write(acs.join("num_vehicles.csv"), concat!(
        "GEOID,Aggregate number of vehicles available_num_vehicles\n",
        "170310000001,500\n",
        "170310000002,200\n",
        "170310000003,3\n",
        "170310000004,50\n",
        "170310000005,50\n",
    )).unwrap();

    fs::write(acs.join("hispanic_res.csv"), concat!(
        "GEOID,Total_hispanic_res,Hispanic or Latino_hispanic_res\n",
        "170310000001,1000,100\n",
        "170310000002,400,200\n",
        "170310000003,0,0\n",
        "170310000004,200,20\n",
        "170310000005,300,30\n",
    )).unwrap();

    fs::write(root.join("block_groups.geojson"), format!(r#"{{"type": "FeatureCollection", "features": [
        {{"type": "Feature", "properties": {{"GEOID": "170310000001"}}, "geometry": {{"type": "Polygon", "coordinates": {}}}}},
        {{"type": "Feature", "properties": {{"GEOID": "170310000002"}}, "geometry": {{"type": "Polygon", "coordinates": {}}}}},
        {{"type": "Feature", "properties": {{"GEOID": "170310000003"}}, "geometry": {{"type": "Polygon", "coordinates": {}}}}},
        {{"type": "Feature", "properties": {{"GEOID": "170310000004"}}, "geometry": {{"type": "Polygon", "coordinates": {}}}}},
        {{"type": "Feature", "properties": {{"GEOID": "170310000005"}}, "geometry": null}}
    ]}}"#,
        square(-87.700, 41.850), square(-87.650, 41.850), square(-87.600, 41.850), square(-87.550, 41.850),
    )).unwrap();

    fs::write(root.join("rail_stops.csv"), concat!(
        "STOP_ID,STOP_NAME,Location\n",
        "30001,Center of G1,\"(41.855, -87.695)\"\n",
        "30002,Near G2,\"(41.857, -87.645)\"\n",
        "30003,Far north,\"(41.900, -87.620)\"\n",
    )).unwrap();

    fs::write(root.join("bus_stops.geojson"), r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"SYSTEMSTOP": 10, "PUBLIC_NAM": "G2 busy corner", "ROUTESSTPG": "22,36,151", "STATUS": 1},
         "geometry": {"type": "Point", "coordinates": [-87.644, 41.855]}},
        {"type": "Feature", "properties": {"SYSTEMSTOP": 11, "PUBLIC_NAM": "G3 closed", "ROUTESSTPG": "8", "STATUS": 0},
         "geometry": {"type": "Point", "coordinates": [-87.595, 41.855]}},
        {"type": "Feature", "properties": {"SYSTEMSTOP": 12, "PUBLIC_NAM": "G3 unrouted", "ROUTESSTPG": "", "STATUS": 1},
         "geometry": {"type": "Point", "coordinates": [-87.596, 41.856]}},
        {"type": "Feature", "properties": {"SYSTEMSTOP": 13, "PUBLIC_NAM": "G4", "ROUTESSTPG": "4", "STATUS": 1},
         "geometry": {"type": "Point", "coordinates": [-87.545, 41.855]}}
    ]}"#).unwrap();
}

/// Write G1..G4 as `block_groups.shp` (G5 has no shape and is left out).
/// The key is a character field, or a numeric one when `numeric_key` is set.
fn write_block_groups_shp(root: &Path, numeric_key: bool) -> std::path::PathBuf {
    let path = root.join("block_groups.shp");
    let name = FieldName::try_from("GEOID").unwrap();
    let table = if numeric_key {
        TableWriterBuilder::new().add_numeric_field(name, 12, 0)
    } else {
        TableWriterBuilder::new().add_character_field(name, 12)
    };

    let mut writer = shapefile::Writer::from_path(&path, table).unwrap();
    for (geo_id, x, y) in CORNERS {
        let s = 0.01;
        // clockwise exterior
        let ring = vec![
            shapefile::Point::new(x, y),
            shapefile::Point::new(x, y + s),
            shapefile::Point::new(x + s, y + s),
            shapefile::Point::new(x + s, y),
            shapefile::Point::new(x, y),
        ];
        let polygon = shapefile::Polygon::new(PolygonRing::Outer(ring));

        let mut record = Record::default();
        let value = if numeric_key {
            FieldValue::Numeric(Some(geo_id as f64))
        } else {
            FieldValue::Character(Some(geo_id.to_string()))
        };
        record.insert("GEOID".to_string(), value);
        writer.write_shape_and_record(&polygon, &record).unwrap();
    }
    drop(writer);

    fs::write(path.with_extension("prj"), TIGER_PRJ).unwrap();
    path
}

fn config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        acs_dir: root.join("ACS"),
        blocks: root.join("block_groups.geojson"),
        bus_stops: root.join("bus_stops.geojson"),
        rail_stops: root.join("rail_stops.csv"),
        ..PipelineConfig::default()
    }
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().cast(&DataType::Float64).unwrap().f64().unwrap().into_iter().collect()
}

fn assert_close(actual: &[Option<f64>], expected: &[Option<f64>]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        match (a, e) {
            (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}"),
            (None, None) => {}
            _ => panic!("{actual:?} vs {expected:?}"),
        }
    }
}

#[test]
fn one_row_per_block_group_in_every_source() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let df = run_pipeline(&config(dir.path())).unwrap();

    let keys = df.column(KEY).unwrap().i64().unwrap().into_no_null_iter().collect::<Vec<_>>();
    assert_eq!(keys, vec![G1, G2, G3]);

    assert_close(&floats(&df, "num_stops"), &[Some(1.0), Some(4.0), Some(0.0)]);
    assert_close(&floats(&df, "total_pop"), &[Some(1000.0), Some(400.0), Some(0.0)]);
    assert_close(&floats(&df, "pct_working_age"), &[Some(0.5), Some(0.25), None]);
    assert_close(&floats(&df, "total_hh"), &[Some(200.0), Some(100.0), Some(10.0)]);
    assert_close(&floats(&df, "pct_hh_pov"), &[Some(0.25), Some(0.5), Some(0.2)]);
    assert_close(&floats(&df, "pct_white"), &[Some(0.5), Some(0.25), None]);
    assert_close(&floats(&df, "pct_black"), &[Some(0.25), Some(0.5), None]);
    assert_close(&floats(&df, "pct_other_race"), &[Some(0.25), Some(0.25), None]);
    assert_close(&floats(&df, "pct_long_commute"), &[Some(0.4), Some(0.4), Some(0.4)]);
    assert_close(&floats(&df, "pct_car"), &[Some(0.5), Some(0.25), Some(0.6)]);
    assert_close(&floats(&df, "pct_walk"), &[Some(0.1), Some(0.1), Some(0.1)]);
    assert_close(&floats(&df, "pct_other_mode"), &[Some(0.15), Some(0.15), Some(0.1)]);
    assert_close(&floats(&df, "pct_transit"), &[Some(0.25), Some(0.5), Some(0.2)]);
    assert_close(&floats(&df, "pct_employed"), &[Some(0.6), Some(0.25), None]);
    assert_close(&floats(&df, "vehicles_per_capita"), &[Some(0.5), Some(0.5), None]);
    assert_close(&floats(&df, "pct_hispanic"), &[Some(0.1), Some(0.5), None]);
    assert_close(&floats(&df, "interaction"), &[Some(0.25), Some(2.0), Some(0.0)]);

    // raw per-capita numerators are gone
    assert!(df.column("Total_employment").is_err());

    // 0.01° squares at 41.85°N are about 0.355 square miles
    let areas = floats(&df, "area");
    for area in &areas {
        assert!((area.unwrap() - 0.355).abs() < 0.01, "area was {area:?}");
    }
    let expected_density = [1000.0, 400.0, 0.0].iter().zip(&areas)
        .map(|(pop, area)| Some(pop / area.unwrap()))
        .collect::<Vec<_>>();
    assert_close(&floats(&df, "density"), &expected_density);
}

#[test]
fn tiger_shapefile_matches_geojson() {
    for numeric_key in [false, true] {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path());
        let blocks = write_block_groups_shp(dir.path(), numeric_key);

        let from_geojson = run_pipeline(&config(dir.path())).unwrap();
        let from_shp = run_pipeline(&PipelineConfig { blocks, ..config(dir.path()) }).unwrap();

        let keys = from_shp.column(KEY).unwrap().i64().unwrap().into_no_null_iter().collect::<Vec<_>>();
        assert_eq!(keys, vec![G1, G2, G3], "numeric key: {numeric_key}");
        assert_close(&floats(&from_shp, "num_stops"), &floats(&from_geojson, "num_stops"));
        assert_close(&floats(&from_shp, "interaction"), &[Some(0.25), Some(2.0), Some(0.0)]);

        // NAD83 and WGS84 squares agree to well under a percent
        for (shp, json) in floats(&from_shp, "area").iter().zip(floats(&from_geojson, "area")) {
            assert!((shp.unwrap() - json.unwrap()).abs() < 1e-3, "{shp:?} vs {json:?}");
        }
    }
}

#[test]
fn missing_acs_table_aborts() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    fs::remove_file(dir.path().join("ACS/hispanic_res.csv")).unwrap();

    let err = run_pipeline(&config(dir.path())).unwrap_err();
    assert!(format!("{err:#}").contains("hispanic_res.csv"));
}

#[test]
fn run_command_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let cfg = config(dir.path());
    let output = dir.path().join("linked.csv");
    let args = RunArgs {
        acs_dir: Some(cfg.acs_dir),
        blocks: Some(cfg.blocks),
        bus_stops: Some(cfg.bus_stops),
        rail_stops: Some(cfg.rail_stops),
        output: Some(output.clone()),
        ..RunArgs::default()
    };
    run::run(&args).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("GEOID,"));
    assert!(header.contains("density") && header.contains("interaction"));
    assert_eq!(lines.count(), 3);

    // refuses to clobber without --force
    assert!(run::run(&args).is_err());
    assert!(run::run(&RunArgs { force: true, ..args }).is_ok());
}
