use std::env;

fn main() {
    // Read flow counter configuration from environment variables (optional)
    // Values that fail to parse fall back to the defaults at runtime

    // Partition label of the counter region
    if let Ok(label) = env::var("FLOW_COUNTER_LABEL") {
        println!("cargo:rustc-env=FLOW_COUNTER_LABEL={}", label);
        println!(
            "cargo:warning=Using FLOW_COUNTER_LABEL from environment: {}",
            label
        );
    } else {
        println!("cargo:rustc-env=FLOW_COUNTER_LABEL=flow_data0");
    }

    // Sensor pulses per liter
    if let Ok(pulses) = env::var("FLOW_PULSES_PER_LITER") {
        println!("cargo:rustc-env=FLOW_PULSES_PER_LITER={}", pulses);
        println!(
            "cargo:warning=Using FLOW_PULSES_PER_LITER from environment: {}",
            pulses
        );
    } else {
        println!("cargo:rustc-env=FLOW_PULSES_PER_LITER=270");
    }

    // Liters per counter step
    if let Ok(liters) = env::var("FLOW_LITERS_PER_STEP") {
        println!("cargo:rustc-env=FLOW_LITERS_PER_STEP={}", liters);
        println!(
            "cargo:warning=Using FLOW_LITERS_PER_STEP from environment: {}",
            liters
        );
    } else {
        println!("cargo:rustc-env=FLOW_LITERS_PER_STEP=10");
    }

    // Sampling period in milliseconds
    if let Ok(period) = env::var("FLOW_SAMPLE_PERIOD_MS") {
        println!("cargo:rustc-env=FLOW_SAMPLE_PERIOD_MS={}", period);
        println!(
            "cargo:warning=Using FLOW_SAMPLE_PERIOD_MS from environment: {}",
            period
        );
    } else {
        println!("cargo:rustc-env=FLOW_SAMPLE_PERIOD_MS=200");
    }

    // Read back every counter write (default: false)
    if let Ok(verify) = env::var("FLOW_COUNTER_VERIFY_WRITES") {
        println!("cargo:rustc-env=FLOW_COUNTER_VERIFY_WRITES={}", verify);
        println!(
            "cargo:warning=Using FLOW_COUNTER_VERIFY_WRITES from environment: {}",
            verify
        );
    } else {
        println!("cargo:rustc-env=FLOW_COUNTER_VERIFY_WRITES=false");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=FLOW_COUNTER_LABEL");
    println!("cargo:rerun-if-env-changed=FLOW_PULSES_PER_LITER");
    println!("cargo:rerun-if-env-changed=FLOW_LITERS_PER_STEP");
    println!("cargo:rerun-if-env-changed=FLOW_SAMPLE_PERIOD_MS");
    println!("cargo:rerun-if-env-changed=FLOW_COUNTER_VERIFY_WRITES");
}
