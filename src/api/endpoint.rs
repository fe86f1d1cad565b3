pub type Endpoint = str;

pub const LOGIN: &Endpoint = "/public/login.php";
pub const DEVICES: &Endpoint = "/public/devices.php";
pub const DEVICE_VALUES: &Endpoint = "/public/ajax_device_values.php";
