fn main() {
    uniffi::generate_scaffolding("src/ocs_voice.udl").unwrap();
}
