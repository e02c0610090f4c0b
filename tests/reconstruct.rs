use metafitch::commands::reconstruct::{run, ReconstructArgs};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TREE: &str = "(A:1,(B:1,C:1)BC:2)root;";
const METADATA_TSV: &str = "strain\tcolor\tsize\n\
                            A\tred\tsmall\n\
                            B\tblue\t\n\
                            C\tblue\tlarge\n";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write input");
    path
}

fn write_gz(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let file = fs::File::create(&path).expect("create gz input");
    let mut writer = niffler::get_writer(
        Box::new(file),
        niffler::compression::Format::Gzip,
        niffler::Level::Six,
    )
    .expect("gz writer");
    writer.write_all(content.as_bytes()).expect("write gz input");
    drop(writer);
    path
}

fn read_any(path: &Path) -> String {
    let (mut reader, _) =
        niffler::get_reader(Box::new(fs::File::open(path).expect("open output"))).expect("reader");
    let mut text = String::new();
    reader.read_to_string(&mut text).expect("read output");
    text
}

fn base_args(dir: &TempDir, tree: PathBuf, metadata: PathBuf, output: &str) -> ReconstructArgs {
    ReconstructArgs {
        tree,
        metadata,
        output: dir.path().join(output),
        ..Default::default()
    }
}

#[test]
fn reconstructs_every_labeled_node() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(&dir, "tree.nwk", TREE);
    let metadata = write_file(&dir, "metadata.tsv", METADATA_TSV);
    let args = base_args(&dir, tree, metadata, "out.tsv");
    let output = args.output.clone();

    run(args).expect("reconstruct");

    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "strain\tcolor\tsize\n\
         root\t\t\n\
         A\tred\tsmall\n\
         BC\tblue\tlarge\n\
         B\tblue\tlarge\n\
         C\tblue\tlarge\n"
    );
}

#[test]
fn tolerant_mode_lists_candidates_in_csv() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(&dir, "tree.nwk", TREE);
    let metadata = write_file(&dir, "metadata.tsv", METADATA_TSV);
    let mut args = base_args(&dir, tree, metadata, "out.csv");
    args.tolerate_ambiguity = true;
    args.fields = Some("color".to_string());
    let output = args.output.clone();

    run(args).expect("reconstruct");

    let text = fs::read_to_string(output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("strain,color"));
    assert_eq!(lines.next(), Some("root,\"blue, red\""));
    assert_eq!(lines.next(), Some("A,red"));
}

#[test]
fn compressed_inputs_and_output() {
    let dir = TempDir::new().unwrap();
    let plain_tree = write_file(&dir, "tree.nwk", TREE);
    let plain_meta = write_file(&dir, "metadata.tsv", METADATA_TSV);
    let plain = base_args(&dir, plain_tree, plain_meta, "plain.tsv");
    let plain_output = plain.output.clone();
    run(plain).expect("plain run");

    let gz_tree = write_gz(&dir, "tree.nwk.gz", TREE);
    let gz_meta = write_gz(&dir, "metadata.tsv.gz", METADATA_TSV);
    let compressed = base_args(&dir, gz_tree, gz_meta, "out.tsv.gz");
    let gz_output = compressed.output.clone();
    run(compressed).expect("compressed run");

    let raw = fs::read(&gz_output).unwrap();
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);
    assert_eq!(read_any(&gz_output), fs::read_to_string(plain_output).unwrap());
}

#[test]
fn output_is_identical_across_runs_and_threads() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(
        &dir,
        "tree.nwk",
        "((A,B)n1,((C,D)n2,(E,F,G)n3)n4,H)root;",
    );
    let mut metadata = String::from("strain,f1,f2,f3,f4,f5,f6\n");
    for (idx, id) in ["A", "B", "C", "D", "E", "F", "G", "H"].iter().enumerate() {
        metadata.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            id,
            ["x", "y"][idx % 2],
            ["p", "q", "r"][idx % 3],
            if idx < 4 { "lo" } else { "hi" },
            if idx == 3 { "" } else { "same" },
            ["m", "n", "o", "p"][idx % 4],
            idx
        ));
    }
    let metadata = write_file(&dir, "metadata.csv", &metadata);

    let mut outputs = Vec::new();
    for (run_idx, threads) in [1, 1, 3, 6].into_iter().enumerate() {
        let mut args = base_args(&dir, tree.clone(), metadata.clone(), &format!("out{}.tsv", run_idx));
        args.threads = Some(threads);
        args.tolerate_ambiguity = true;
        let output = args.output.clone();
        run(args).expect("reconstruct");
        outputs.push(fs::read(output).unwrap());
    }

    for output in &outputs[1..] {
        assert_eq!(output, &outputs[0]);
    }
    let text = String::from_utf8(outputs[0].clone()).unwrap();
    assert!(text.starts_with("strain\tf1\tf2\tf3\tf4\tf5\tf6\n"));
    // Every leaf shares f4 once D inherits it
    assert!(text.lines().skip(1).all(|line| line.split('\t').nth(4) == Some("same")));
}

#[test]
fn explicit_id_field_and_field_order() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(&dir, "tree.nwk", "(s1,s2)anc;");
    let metadata = write_file(
        &dir,
        "metadata.csv",
        "row,name,country,host\n1,s1,UK,bat\n2,s2,UK,human\n",
    );
    let mut args = base_args(&dir, tree, metadata, "out.csv");
    args.id_field = Some("name".to_string());
    args.fields = Some("host, country".to_string());
    let output = args.output.clone();

    run(args).expect("reconstruct");

    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "strain,host,country\nanc,,UK\ns1,bat,UK\ns2,human,UK\n"
    );
}

#[test]
fn missing_columns_are_fatal_and_write_nothing() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(&dir, "tree.nwk", TREE);
    let metadata = write_file(&dir, "metadata.tsv", METADATA_TSV);

    let mut missing_field = base_args(&dir, tree.clone(), metadata.clone(), "out1.tsv");
    missing_field.fields = Some("color,host".to_string());
    let output = missing_field.output.clone();
    let err = run(missing_field).unwrap_err();
    assert!(format!("{:#}", err).contains("'host'"));
    assert!(!output.exists());

    let mut missing_id = base_args(&dir, tree, metadata, "out2.tsv");
    missing_id.id_field = Some("accession".to_string());
    let output = missing_id.output.clone();
    let err = run(missing_id).unwrap_err();
    assert!(format!("{:#}", err).contains("'accession'"));
    assert!(!output.exists());
}

#[test]
fn malformed_tree_is_fatal() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(&dir, "tree.nwk", "((A,B);");
    let metadata = write_file(&dir, "metadata.tsv", METADATA_TSV);
    let args = base_args(&dir, tree, metadata, "out.tsv");
    let output = args.output.clone();

    let err = run(args).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read tree"));
    assert!(!output.exists());
}

#[test]
fn config_file_sets_label_column_and_separator() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(&dir, "tree.nwk", TREE);
    let metadata = write_file(&dir, "metadata.tsv", METADATA_TSV);
    let config = write_file(
        &dir,
        "config.toml",
        "label_column = \"node\"\nambiguity_separator = \"|\"\ntolerate_ambiguity = true\n",
    );
    let mut args = base_args(&dir, tree, metadata, "out.tsv");
    args.config = Some(config);
    args.fields = Some("color".to_string());
    let output = args.output.clone();

    run(args).expect("reconstruct");

    let text = fs::read_to_string(output).unwrap();
    assert!(text.starts_with("node\tcolor\nroot\tblue|red\n"));
}

#[test]
fn invalid_explicit_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(&dir, "tree.nwk", TREE);
    let metadata = write_file(&dir, "metadata.tsv", METADATA_TSV);
    let config = write_file(&dir, "config.toml", "threads = \"many\"\n");
    let mut args = base_args(&dir, tree.clone(), metadata.clone(), "out.tsv");
    args.config = Some(config);
    let err = run(args).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load configuration"));

    let mut missing = base_args(&dir, tree, metadata, "out_missing.tsv");
    missing.config = Some(dir.path().join("absent.toml"));
    assert!(run(missing).is_err());
}

#[test]
fn writes_run_summary() {
    let dir = TempDir::new().unwrap();
    let tree = write_file(&dir, "tree.nwk", TREE);
    let metadata = write_file(&dir, "metadata.tsv", METADATA_TSV);
    let mut args = base_args(&dir, tree, metadata, "out.tsv");
    let summary = dir.path().join("summary.json");
    args.summary = Some(summary.clone());

    run(args).expect("reconstruct");

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(summary).unwrap()).unwrap();
    assert_eq!(json["tree"]["nodes"], 5);
    assert_eq!(json["tree"]["labeled_nodes"], 5);
    assert_eq!(json["metadata"]["records"], 3);
    assert_eq!(json["fields"][0]["field"], "color");
    assert_eq!(json["fields"][0]["ambiguous"], 1);
    assert_eq!(json["fields"][1]["field"], "size");
}
